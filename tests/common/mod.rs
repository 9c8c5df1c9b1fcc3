#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::{TempDir, tempdir};

pub const BRONZE_PANEL: &str = "\
Country name,year,Life Ladder,Log GDP per capita,Healthy life expectancy at birth,Generosity
Afghanistan,2018,3.632,7.695,52.6,-0.1
Afghanistan,2019,2.375,,52.4,-0.11
Congo (Brazzaville),2019,5.2,8.1,57.0,-0.05
Wonderland,2021,5.0,9.0,60.0,0.3
Atlantis,2015,6.1,9.9,70.0,0.2
";

pub const BRONZE_SNAPSHOT: &str = "\
Country name,Regional indicator,Ladder score,Logged GDP per capita,Healthy life expectancy,Generosity
Afghanistan,Southern Asia,2.523,7.695,52.493,-0.102
Congo (Brazzaville),Sub-Saharan Africa,5.342,8.117,58.221,-0.04
Wonderland,Fictional,7.0,9.5,65.0,0.5
";

pub const BRONZE_GEO: &str = "\
country,latitude,longitude,name
AF,33.93911,67.709953,Afghanistan
CG,-0.228021,15.827659,Congo [Republic]
UM,,,U.S. Minor Outlying Islands
";

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` under the workspace (creating folders) and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create fixture folder");
        }
        fs::write(&path, contents).expect("write fixture");
        path
    }

    /// Seeds `data/bronze` with the three raw tables.
    pub fn seed_bronze(&self) -> PathBuf {
        self.write("data/bronze/world-happiness-report.csv", BRONZE_PANEL);
        self.write("data/bronze/world-happiness-report-2021.csv", BRONZE_SNAPSHOT);
        self.write("data/bronze/geolocation.csv", BRONZE_GEO);
        self.path().join("data").join("bronze")
    }
}
