use crate::error::DecodeError;
use crate::model::Point;

/// Decode the CSV text of a `<data encoding="csv">` element into rows of tile ids.
///
/// Rows are separated by newlines and cells by commas. Empty tokens (trailing commas)
/// are dropped, and so are lines left without any token; every other token must be a
/// non-negative integer.
/// The shape is not checked against the layer's declared size here.
pub fn decode_grid(text: &str) -> Result<Vec<Vec<u32>>, DecodeError> {
    let mut rows = Vec::new();
    for line in text.trim().lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let row_index = rows.len();
        let mut row = Vec::new();
        for token in line.split(',') {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }
            let id = token
                .parse::<u32>()
                .map_err(|_| DecodeError::InvalidGridToken {
                    row: row_index,
                    token: token.to_owned(),
                })?;
            row.push(id);
        }
        if !row.is_empty() {
            rows.push(row);
        }
    }
    Ok(rows)
}

/// Decode a polygon `points` attribute: whitespace separated `x,y` pairs.
pub fn decode_points(text: &str) -> Result<Vec<Point>, DecodeError> {
    text.split_whitespace()
        .map(|token| {
            let invalid = || DecodeError::InvalidPoint(token.to_owned());
            let (x, y) = token.split_once(',').ok_or_else(invalid)?;
            Ok(Point {
                x: x.parse().map_err(|_| invalid())?,
                y: y.parse().map_err(|_| invalid())?,
            })
        })
        .collect()
}
