//! ESRI ASCII rasters and plain value matrices

use std::path::Path;

use crate::error::{SimError, SimResult};

const DEFAULT_NODATA: f64 = -9999.0;

/// An ESRI ASCII grid
///
/// Values are stored row-major with row 0 at the northern edge, exactly as
/// they appear in the file.
#[derive(Debug, Clone, PartialEq)]
pub struct AsciiRaster {
    pub ncols: usize,
    pub nrows: usize,
    /// West edge (or west cell centre when given as `xllcenter`)
    pub xll: f64,
    /// South edge (or south cell centre when given as `yllcenter`)
    pub yll: f64,
    pub cell_size: f64,
    pub nodata: f64,
    pub values: Vec<f64>,
}

impl AsciiRaster {
    pub fn read(path: &Path) -> SimResult<Self> {
        let source_name = path.display().to_string();
        let text = std::fs::read_to_string(path)
            .map_err(|e| SimError::data(&source_name, format!("cannot read file: {e}")))?;
        Self::parse(&source_name, &text)
    }

    /// Parse raster text; `source_name` labels errors
    pub fn parse(source_name: &str, text: &str) -> SimResult<Self> {
        let err = |message: String| SimError::data(source_name, message);
        let mut lines = text
            .lines()
            .enumerate()
            .map(|(index, line)| (index + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty())
            .peekable();

        let mut ncols = None;
        let mut nrows = None;
        let mut xll = None;
        let mut yll = None;
        let mut cell_size = None;
        let mut nodata = DEFAULT_NODATA;

        while let Some(&(line_no, line)) = lines.peek() {
            let mut parts = line.split_whitespace();
            let (Some(key), Some(value)) = (parts.next(), parts.next()) else {
                break;
            };
            if !key.starts_with(|c: char| c.is_ascii_alphabetic()) {
                break;
            }
            let number = value
                .parse::<f64>()
                .map_err(|_| err(format!("line {line_no}: cannot parse header '{key}' value '{value}'")))?;
            match key.to_ascii_lowercase().as_str() {
                "ncols" => ncols = Some(dimension(number, key, line_no, &err)?),
                "nrows" => nrows = Some(dimension(number, key, line_no, &err)?),
                "xllcorner" | "xllcenter" => xll = Some(number),
                "yllcorner" | "yllcenter" => yll = Some(number),
                "cellsize" => cell_size = Some(number),
                "nodata_value" => nodata = number,
                _ => return Err(err(format!("line {line_no}: unknown header key '{key}'"))),
            }
            lines.next();
        }

        let missing = |name: &str| err(format!("missing required header '{name}'"));
        let ncols = ncols.ok_or_else(|| missing("ncols"))?;
        let nrows = nrows.ok_or_else(|| missing("nrows"))?;
        let xll = xll.ok_or_else(|| missing("xllcorner"))?;
        let yll = yll.ok_or_else(|| missing("yllcorner"))?;
        let cell_size = cell_size.ok_or_else(|| missing("cellsize"))?;
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(err(format!("cellsize must be positive, got {cell_size}")));
        }

        let mut values = Vec::with_capacity(ncols * nrows);
        let mut data_rows = 0;
        for (line_no, line) in lines {
            data_rows += 1;
            if data_rows > nrows {
                return Err(err(format!(
                    "line {line_no}: more than the {nrows} data rows declared by nrows"
                )));
            }
            let before = values.len();
            for token in line.split_whitespace() {
                let value = token
                    .parse::<f64>()
                    .map_err(|_| err(format!("line {line_no}: cannot parse value '{token}'")))?;
                values.push(value);
            }
            let found = values.len() - before;
            if found != ncols {
                return Err(err(format!(
                    "line {line_no}: expected {ncols} values (ncols), found {found}"
                )));
            }
        }
        if data_rows != nrows {
            return Err(err(format!(
                "expected {nrows} data rows (nrows), found {data_rows}"
            )));
        }

        Ok(Self {
            ncols,
            nrows,
            xll,
            yll,
            cell_size,
            nodata,
            values,
        })
    }

    /// True when `value` is the nodata marker
    #[inline]
    pub fn is_nodata(&self, value: f64) -> bool {
        (value - self.nodata).abs() < 1e-9
    }
}

fn dimension(
    value: f64,
    key: &str,
    line_no: usize,
    err: &impl Fn(String) -> SimError,
) -> SimResult<usize> {
    if value < 1.0 || value.fract() != 0.0 {
        return Err(err(format!(
            "line {line_no}: '{key}' must be a positive integer, got {value}"
        )));
    }
    Ok(value as usize)
}

/// Read a rows × cols matrix of numbers separated by commas or whitespace
pub fn read_matrix(path: &Path, nrows: usize, ncols: usize) -> SimResult<Vec<f64>> {
    let source_name = path.display().to_string();
    let text = std::fs::read_to_string(path)
        .map_err(|e| SimError::data(&source_name, format!("cannot read file: {e}")))?;
    parse_matrix(&source_name, &text, nrows, ncols)
}

/// Parse a rows × cols matrix; `source_name` labels errors
pub fn parse_matrix(source_name: &str, text: &str, nrows: usize, ncols: usize) -> SimResult<Vec<f64>> {
    let mut values = Vec::with_capacity(nrows * ncols);
    let mut rows = 0;
    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        rows += 1;
        let before = values.len();
        for token in line.split(|c: char| c == ',' || c.is_whitespace()).filter(|t| !t.is_empty()) {
            let value = token.parse::<f64>().map_err(|_| {
                SimError::data(
                    source_name,
                    format!("line {}: cannot parse value '{token}'", index + 1),
                )
            })?;
            values.push(value);
        }
        if values.len() - before != ncols {
            return Err(SimError::data(
                source_name,
                format!(
                    "line {}: expected {ncols} values, found {}",
                    index + 1,
                    values.len() - before
                ),
            ));
        }
    }
    if rows != nrows {
        return Err(SimError::data(
            source_name,
            format!("expected {nrows} rows, found {rows}"),
        ));
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FOREST: &str = "ncols 3\nNROWS 2\nxllcorner 100.0\nyllcorner 200.0\ncellsize 100\nNODATA_value -9999\n2 2 -9999\n2 101 2\n";

    #[test]
    fn test_parse_header_and_values() {
        let raster = AsciiRaster::parse("Forest.asc", FOREST).unwrap();
        assert_eq!((raster.nrows, raster.ncols), (2, 3));
        assert_eq!(raster.cell_size, 100.0);
        assert_eq!(raster.values, vec![2.0, 2.0, -9999.0, 2.0, 101.0, 2.0]);
        assert!(raster.is_nodata(raster.values[2]));
    }

    #[test]
    fn test_nodata_defaults() {
        let text = "ncols 1\nnrows 1\nxllcenter 0\nyllcenter 0\ncellsize 1\n-9999\n";
        let raster = AsciiRaster::parse("Forest.asc", text).unwrap();
        assert_eq!(raster.nodata, -9999.0);
    }

    #[test]
    fn test_row_count_mismatch() {
        let text = "ncols 2\nnrows 2\nxllcorner 0\nyllcorner 0\ncellsize 1\n1 1\n";
        let err = AsciiRaster::parse("Forest.asc", text).unwrap_err().to_string();
        assert!(err.contains("expected 2 data rows"), "{err}");
    }

    #[test]
    fn test_column_count_mismatch() {
        let text = "ncols 2\nnrows 1\nxllcorner 0\nyllcorner 0\ncellsize 1\n1 1 1\n";
        let err = AsciiRaster::parse("Forest.asc", text).unwrap_err().to_string();
        assert!(err.contains("line 6"), "{err}");
    }

    #[test]
    fn test_missing_header() {
        let text = "ncols 1\nnrows 1\nyllcorner 0\ncellsize 1\n1\n";
        let err = AsciiRaster::parse("Forest.asc", text).unwrap_err().to_string();
        assert!(err.contains("xllcorner"), "{err}");
    }

    #[test]
    fn test_matrix_accepts_commas_and_spaces() {
        let values = parse_matrix("values.csv", "1, 2 3\n4 5,6\n", 2, 3).unwrap();
        assert_eq!(values, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert!(parse_matrix("values.csv", "1 2\n", 2, 2).is_err());
    }
}
