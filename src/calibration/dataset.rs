use crate::StrError;
use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Holds uniaxial nominal strain-stress test data
#[derive(Clone, Debug, PartialEq)]
pub struct Dataset {
    /// Nominal (engineering) strains
    pub strain: Vec<f64>,

    /// Nominal (first Piola-Kirchhoff) stresses
    pub stress: Vec<f64>,
}

/// Reads a numeric table with whitespace- or comma-separated columns
///
/// Empty lines and lines starting with `#` are ignored.
fn read_table<P>(full_path: &P) -> Result<Vec<Vec<f64>>, StrError>
where
    P: AsRef<OsStr> + ?Sized,
{
    let path = Path::new(full_path).to_path_buf();
    let file = File::open(&path).map_err(|_| "file not found")?;
    let reader = BufReader::new(file);
    let mut rows: Vec<Vec<f64>> = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line.map_err(|_| "cannot read line")?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let mut row = Vec::new();
        for field in trimmed.split(|c: char| c == ',' || c.is_whitespace()) {
            if field.is_empty() {
                continue;
            }
            match field.parse::<f64>() {
                Ok(v) => row.push(v),
                Err(_) => {
                    println!("ERROR: cannot parse \"{}\" at line {} of {:?}", field, i + 1, path);
                    return Err("cannot parse number in data file");
                }
            }
        }
        if let Some(first) = rows.first() {
            if first.len() != row.len() {
                println!("ERROR: line {} of {:?} has {} columns instead of {}", i + 1, path, row.len(), first.len());
                return Err("all rows of the data file must have the same number of columns");
            }
        }
        rows.push(row);
    }
    if rows.is_empty() {
        return Err("data file is empty");
    }
    Ok(rows)
}

/// Extracts one column of a table
fn column(rows: &[Vec<f64>], index: usize) -> Result<Vec<f64>, StrError> {
    if index >= rows[0].len() {
        return Err("column index is out of range");
    }
    Ok(rows.iter().map(|row| row[index]).collect())
}

impl Dataset {
    /// Allocates a new instance
    pub fn new(strain: Vec<f64>, stress: Vec<f64>) -> Result<Self, StrError> {
        if strain.len() != stress.len() {
            return Err("strain and stress must have the same length");
        }
        Ok(Dataset { strain, stress })
    }

    /// Returns the number of data points
    pub fn len(&self) -> usize {
        self.strain.len()
    }

    /// Returns true if there are no data points
    pub fn is_empty(&self) -> bool {
        self.strain.is_empty()
    }

    /// Reads a two-column file with strain in the first column and stress in the second column
    ///
    /// # Input
    ///
    /// * `full_path` -- may be a String, &str, or Path
    pub fn read_two_columns<P>(full_path: &P) -> Result<Self, StrError>
    where
        P: AsRef<OsStr> + ?Sized,
    {
        let rows = read_table(full_path)?;
        if rows[0].len() != 2 {
            return Err("data file must have exactly two columns");
        }
        Dataset::new(column(&rows, 0)?, column(&rows, 1)?)
    }

    /// Reads one specimen from a pair of matrix files (one column per specimen)
    ///
    /// # Input
    ///
    /// * `strain_path` -- file with the nominal strains of all specimens
    /// * `stress_path` -- file with the nominal stresses of all specimens
    /// * `specimen` -- the column index of the specimen
    pub fn read_specimen<P>(strain_path: &P, stress_path: &P, specimen: usize) -> Result<Self, StrError>
    where
        P: AsRef<OsStr> + ?Sized,
    {
        let strains = read_table(strain_path)?;
        let stresses = read_table(stress_path)?;
        if strains.len() != stresses.len() || strains[0].len() != stresses[0].len() {
            return Err("strain and stress files must have the same dimensions");
        }
        Dataset::new(column(&strains, specimen)?, column(&stresses, specimen)?)
    }

    /// Returns the preprocessed data within the strain window `[0, max_strain]`
    ///
    /// 1. Removes the points with zero stress
    /// 2. Shifts the data so that the first point is at the origin
    /// 3. Keeps the points with strain less than or equal to `max_strain`
    pub fn preprocess(&self, max_strain: f64) -> Result<Self, StrError> {
        let (strain, stress): (Vec<f64>, Vec<f64>) = self
            .strain
            .iter()
            .zip(&self.stress)
            .filter(|(_, sig)| **sig != 0.0)
            .map(|(eps, sig)| (*eps, *sig))
            .unzip();
        if strain.is_empty() {
            return Err("all stress values are zero");
        }
        let (eps0, sig0) = (strain[0], stress[0]);
        let (strain, stress): (Vec<f64>, Vec<f64>) = strain
            .iter()
            .zip(&stress)
            .map(|(eps, sig)| (eps - eps0, sig - sig0))
            .filter(|(eps, _)| *eps <= max_strain)
            .unzip();
        Dataset::new(strain, stress)
    }
}

/// Reads a file with names separated by whitespace (e.g., one specimen name per line)
pub fn read_names<P>(full_path: &P) -> Result<Vec<String>, StrError>
where
    P: AsRef<OsStr> + ?Sized,
{
    let path = Path::new(full_path).to_path_buf();
    let file = File::open(&path).map_err(|_| "file not found")?;
    let reader = BufReader::new(file);
    let mut names = Vec::new();
    for line in reader.lines() {
        let line = line.map_err(|_| "cannot read line")?;
        names.extend(line.split_whitespace().map(|s| s.to_string()));
    }
    Ok(names)
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{read_names, Dataset};
    use std::fs;

    const DIR: &str = "/tmp/hypercal/dataset";

    fn write(name: &str, contents: &str) -> String {
        fs::create_dir_all(DIR).unwrap();
        let path = format!("{}/{}", DIR, name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn new_captures_errors() {
        assert_eq!(
            Dataset::new(vec![0.0, 1.0], vec![0.0]).err(),
            Some("strain and stress must have the same length")
        );
    }

    #[test]
    fn read_two_columns_works() {
        let path = write("two.txt", "# strain stress\n0.0, 0.0\n0.01 0.5\n\n0.02,\t1.1\n");
        let data = Dataset::read_two_columns(&path).unwrap();
        assert_eq!(data.strain, &[0.0, 0.01, 0.02]);
        assert_eq!(data.stress, &[0.0, 0.5, 1.1]);
        assert_eq!(data.len(), 3);
        assert!(!data.is_empty());
    }

    #[test]
    fn read_captures_errors() {
        assert_eq!(Dataset::read_two_columns("/tmp/hypercal/__not_found__.txt").err(), Some("file not found"));
        let path = write("three.txt", "0 1 2\n3 4 5\n");
        assert_eq!(
            Dataset::read_two_columns(&path).err(),
            Some("data file must have exactly two columns")
        );
        let path = write("ragged.txt", "0 1\n3 4 5\n");
        assert_eq!(
            Dataset::read_two_columns(&path).err(),
            Some("all rows of the data file must have the same number of columns")
        );
        let path = write("bad.txt", "0 1\n3 x\n");
        assert_eq!(Dataset::read_two_columns(&path).err(), Some("cannot parse number in data file"));
        let path = write("empty.txt", "\n# nothing\n");
        assert_eq!(Dataset::read_two_columns(&path).err(), Some("data file is empty"));
    }

    #[test]
    fn read_specimen_works() {
        let strain = write("strain.txt", "0.0 0.0\n0.1 0.2\n0.2 0.4\n");
        let stress = write("stress.txt", "0.0 0.0\n1.0 3.0\n2.0 6.0\n");
        let data = Dataset::read_specimen(&strain, &stress, 1).unwrap();
        assert_eq!(data.strain, &[0.0, 0.2, 0.4]);
        assert_eq!(data.stress, &[0.0, 3.0, 6.0]);
        assert_eq!(
            Dataset::read_specimen(&strain, &stress, 2).err(),
            Some("column index is out of range")
        );
        let names = write("names.txt", "spec_a\nspec_b\n");
        assert_eq!(read_names(&names).unwrap(), &["spec_a", "spec_b"]);
    }

    #[test]
    fn preprocess_works() {
        let data = Dataset::new(
            vec![0.00, 0.01, 0.02, 0.03, 0.05, 0.20],
            vec![0.00, 0.10, 0.15, 0.20, 0.30, 0.90],
        )
        .unwrap();
        let pre = data.preprocess(0.045).unwrap();
        // zero stress removed, then shifted by (0.01, 0.10)
        assert_eq!(pre.len(), 4);
        russell_lab::vec_approx_eq(&russell_lab::Vector::from(&pre.strain), &[0.0, 0.01, 0.02, 0.04], 1e-15);
        russell_lab::vec_approx_eq(&russell_lab::Vector::from(&pre.stress), &[0.0, 0.05, 0.10, 0.20], 1e-15);
        let zeros = Dataset::new(vec![0.0, 1.0], vec![0.0, 0.0]).unwrap();
        assert_eq!(zeros.preprocess(1.0).err(), Some("all stress values are zero"));
    }
}
