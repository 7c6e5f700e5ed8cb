use crate::StrError;
use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Default number of decimal places in numeric tables
pub const DEFAULT_DECIMALS: usize = 12;

/// Default column delimiter in numeric tables
pub const DEFAULT_DELIMITER: &str = ",";

/// Formats a number in C-style scientific notation (e.g., `1.50e+00`, `-2.5000e-07`)
///
/// The exponent always carries its sign and at least two digits.
pub fn format_scientific(value: f64, decimals: usize) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf".to_string() } else { "-inf".to_string() };
    }
    let text = format!("{:.*e}", decimals, value);
    match text.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(d) => ('-', d),
                None => ('+', exponent),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => text,
    }
}

/// Writes a numeric table with a header line and aligned columns
///
/// All columns have the same width: the largest among the headers and the formatted
/// values. Headers are left-aligned and separated by a space; values are left-aligned
/// and separated by `delimiter`.
///
/// # Input
///
/// * `full_path` -- the path of the file; the directory is created if needed
/// * `headers` -- the column names
/// * `columns` -- the values of each column (all with the same length)
/// * `decimals` -- the number of decimal places
/// * `delimiter` -- the separator between values
pub fn write_table<P, S>(
    full_path: &P,
    headers: &[S],
    columns: &[&[f64]],
    decimals: usize,
    delimiter: &str,
) -> Result<(), StrError>
where
    P: AsRef<OsStr> + ?Sized,
    S: AsRef<str>,
{
    if headers.len() != columns.len() {
        return Err("the number of headers must equal the number of columns");
    }
    if columns.is_empty() {
        return Err("at least one column is required");
    }
    let n_rows = columns[0].len();
    if columns.iter().any(|c| c.len() != n_rows) {
        return Err("all columns must have the same length");
    }

    // formatted values and width
    let cells: Vec<Vec<String>> = columns
        .iter()
        .map(|c| c.iter().map(|v| format_scientific(*v, decimals)).collect())
        .collect();
    let max_value = cells.iter().flatten().map(|s| s.len()).max().unwrap_or(0);
    let max_header = headers.iter().map(|h| h.as_ref().chars().count()).max().unwrap_or(0);
    let width = usize::max(max_value, max_header);

    // write file
    let path = Path::new(full_path).to_path_buf();
    if let Some(p) = path.parent() {
        fs::create_dir_all(p).map_err(|_| "cannot create directory")?;
    }
    let file = File::create(&path).map_err(|_| "cannot create file")?;
    let mut buffer = BufWriter::new(file);
    let header: Vec<String> = headers.iter().map(|h| format!("{:<w$}", h.as_ref(), w = width)).collect();
    writeln!(buffer, "{}", header.join(" ")).map_err(|_| "cannot write file")?;
    for i in 0..n_rows {
        let row: Vec<String> = cells.iter().map(|c| format!("{:<w$}", c[i], w = width)).collect();
        writeln!(buffer, "{}", row.join(delimiter)).map_err(|_| "cannot write file")?;
    }
    buffer.flush().map_err(|_| "cannot write file")?;
    Ok(())
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{format_scientific, write_table, DEFAULT_DECIMALS, DEFAULT_DELIMITER};
    use std::fs;

    #[test]
    fn format_scientific_works() {
        assert_eq!(format_scientific(1.5, 2), "1.50e+00");
        assert_eq!(format_scientific(-2.5e-7, 4), "-2.5000e-07");
        assert_eq!(format_scientific(1.0e123, 1), "1.0e+123");
        assert_eq!(format_scientific(0.0, 3), "0.000e+00");
        assert_eq!(format_scientific(f64::NAN, 3), "nan");
        assert_eq!(format_scientific(f64::NEG_INFINITY, 3), "-inf");
    }

    #[test]
    fn write_table_captures_errors() {
        let path = "/tmp/hypercal/table/wrong.csv";
        assert_eq!(
            write_table(path, &["a"], &[&[1.0], &[2.0]], 2, ",").err(),
            Some("the number of headers must equal the number of columns")
        );
        let empty: [&str; 0] = [];
        assert_eq!(
            write_table(path, &empty, &[], 2, ",").err(),
            Some("at least one column is required")
        );
        assert_eq!(
            write_table(path, &["a", "b"], &[&[1.0], &[2.0, 3.0]], 2, ",").err(),
            Some("all columns must have the same length")
        );
    }

    #[test]
    fn write_table_works() {
        let path = "/tmp/hypercal/table/small.csv";
        write_table(path, &["strain", "stress"], &[&[0.0, 0.5], &[-1.0, 2.25]], 2, DEFAULT_DELIMITER).unwrap();
        let text = fs::read_to_string(path).unwrap();
        assert_eq!(text, "strain    stress   \n0.00e+00 ,-1.00e+00\n5.00e-01 ,2.25e+00 \n");

        let path = "/tmp/hypercal/table/long_header.csv";
        write_table(path, &["Young's modulus"], &[&[210.0]], DEFAULT_DECIMALS, ";").unwrap();
        let text = fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Young's modulus   ");
        assert_eq!(lines[1], "2.100000000000e+02");
    }
}
