//! Common test fixtures: a reference-table directory and a report page.

use std::fs;
use std::io;
use std::path::Path;

use crate::generators::{percentile_csv, zscore_csv};

/// One WHO download: file name, whether it is a z-score table, and the
/// `(base, slope, spread)` its synthetic values follow.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceFile {
    pub file: &'static str,
    pub zscore: bool,
    pub base: f64,
    pub slope: f64,
    pub spread: f64,
}

const fn file(file: &'static str, zscore: bool, base: f64, slope: f64, spread: f64) -> ReferenceFile {
    ReferenceFile {
        file,
        zscore,
        base,
        slope,
        spread,
    }
}

/// The twelve files a full catalog reads, with plausible value trends.
pub const WHO_FILES: [ReferenceFile; 12] = [
    file("bmifa-boys-5-19years-per.csv", false, 15.3, 0.45, 1.2),
    file("bmifa-boys-5-19years-z.csv", true, 15.3, 0.45, 1.0),
    file("bmifa-girls-5-19years-per.csv", false, 15.2, 0.48, 1.3),
    file("bmifa-girls-5-19years-z.csv", true, 15.2, 0.48, 1.1),
    file("hfa-boys-5-19years-per.csv", false, 110.3, 5.6, 4.5),
    file("sft-hfa-boys-perc-5-19years.csv", true, 110.3, 5.6, 4.7),
    file("hfa-girls-5-19years-per.csv", false, 109.6, 5.2, 4.4),
    file("sft-hfa-girls-perc-5-19years.csv", true, 109.6, 5.2, 4.6),
    file("wfa-boys-5-10years-per.csv", false, 18.3, 2.6, 2.0),
    file("wfa-boys-5-10years-z.csv", true, 18.3, 2.6, 2.2),
    file("wfa-girls-5-10years-per.csv", false, 18.2, 2.7, 2.1),
    file("wfa-girls-5-10years-z.csv", true, 18.2, 2.7, 2.3),
];

/// Synthetic contents for one WHO download. Weight tables stop at 10.
pub fn reference_file_contents(reference: &ReferenceFile) -> String {
    let to_year = if reference.file.starts_with("wfa") { 10 } else { 19 };
    if reference.zscore {
        zscore_csv(5, to_year, 6, reference.base, reference.slope, reference.spread)
    } else {
        percentile_csv(5, to_year, 6, reference.base, reference.slope, reference.spread)
    }
}

/// Write all twelve WHO files into `dir`, except those named in `skip`.
pub fn write_reference_dir(dir: &Path, skip: &[&str]) -> io::Result<()> {
    fs::create_dir_all(dir)?;
    for reference in WHO_FILES.iter().filter(|r| !skip.contains(&r.file)) {
        fs::write(dir.join(reference.file), reference_file_contents(reference))?;
    }
    Ok(())
}

/// A body-composition report page with every field present.
///
/// Expected values: name "Alex Kim", age 8, gender "Male", height 130 cm,
/// weight 28.0 kg, BMI 16.5. The analysis block precedes the data-text
/// block, so every `bold` div up to index 8 is an analysis value.
pub const REPORT_HTML: &str = r#"<!DOCTYPE html>
<html>
<body>
  <div class="header">
    <span class="name abs">Alex Kim</span>
    <span class="old abs">8</span>
    <span class="sex abs">Male</span>
    <span class="height abs">130 cm</span>
  </div>
  <div class="analysis">
    <div class="bold">Body Composition Analysis</div>
    <div class="bold">6.1</div>
    <div class="bold">10.4</div>
    <div class="bold">4.5</div>
    <div class="bold">1.62</div>
    <div class="bold">5.4</div>
    <div class="bold">16.5</div>
    <div class="bold">21.0</div>
    <div class="bold">22.6</div>
  </div>
  <div class="composition">
    <div class="data-text font-size-nom bold">28.0</div>
    <div class="data-text font-size-nom bold">11.2</div>
    <div class="data-text font-size-nom bold">5.4</div>
    <div class="data-text font-size-nom bold">16.5</div>
    <div class="data-text font-size-nom bold">19.3</div>
  </div>
  <div class="box">78</div>
  <div class="table">
    <div class="td t-center" style="width:55%; text-align: right;"><span>1012</span></div>
    <div class="td t-center" style="width:55%; text-align: right;"><span>1.31</span></div>
    <div class="td t-center" style="width:55%; text-align: right;"><span>0.82</span></div>
    <div class="td t-center" style="width:55%; text-align: right;"><span>3</span></div>
  </div>
</body>
</html>
"#;

/// A report page with only the header block.
pub const SPARSE_REPORT_HTML: &str = r#"<html><body>
  <span class="name abs">Sam</span>
  <span class="sex abs">Female</span>
</body></html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_reference_dir_skips() {
        let dir = tempfile::tempdir().unwrap();
        write_reference_dir(dir.path(), &["wfa-girls-5-10years-z.csv"]).unwrap();

        let count = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(count, 11);
        assert!(!dir.path().join("wfa-girls-5-10years-z.csv").exists());
    }

    #[test]
    fn test_weight_tables_stop_at_ten() {
        let contents = reference_file_contents(&WHO_FILES[8]);
        assert!(contents.lines().last().unwrap().starts_with("10:0,120,"));
    }
}
