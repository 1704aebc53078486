//! @ai:module:intent Read the duration matrix out of a .dzn dataset file
//! @ai:module:layer infrastructure
//! @ai:module:public_api parse_durations, load_durations, DurationMatrix
//! @ai:module:stateless true

use crate::error::DatasetError;
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

/// Durations indexed by job then task.
pub type DurationMatrix = Vec<Vec<u64>>;

fn assignment_start() -> &'static Regex {
    static START: OnceLock<Regex> = OnceLock::new();
    START.get_or_init(|| {
        Regex::new(r"^\s*(?:d|duration)\s*=").expect("duration assignment pattern is valid")
    })
}

/// @ai:intent Parse the `d` / `duration` matrix assignment from dataset text
/// @ai:pre matrix literal uses MiniZinc 2d syntax `[| a,b | c,d |]`
/// @ai:post returns an empty matrix when no such assignment exists
/// @ai:effects pure
pub fn parse_durations(content: &str) -> Result<DurationMatrix, DatasetError> {
    let lines: Vec<&str> = content.lines().collect();

    let Some(start) = lines.iter().position(|l| assignment_start().is_match(l)) else {
        return Ok(vec![]);
    };

    let mut literal = lines[start]
        .split_once('=')
        .map(|(_, rhs)| rhs.trim().to_string())
        .unwrap_or_default();

    // The literal may wrap over several lines until the closing token
    let mut next = start + 1;
    while !literal.contains("|]") && next < lines.len() {
        literal.push(' ');
        literal.push_str(lines[next].trim());
        next += 1;
    }

    let body = literal.replace("[|", "").replace("|]", "").replace(';', "");

    let mut matrix = Vec::new();
    for (row_idx, row) in body.split('|').map(str::trim).filter(|r| !r.is_empty()).enumerate() {
        let values = row
            .split(',')
            .map(str::trim)
            .filter(|cell| !cell.is_empty())
            .map(|cell| {
                cell.parse::<u64>().map_err(|_| DatasetError::InvalidCell {
                    row: row_idx,
                    cell: cell.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if !values.is_empty() {
            matrix.push(values);
        }
    }

    Ok(matrix)
}

/// @ai:intent Read a dataset file and parse its duration matrix
/// @ai:effects fs:read
pub async fn load_durations(path: &Path) -> Result<DurationMatrix, DatasetError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| DatasetError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    parse_durations(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_parse_single_line_matrix() {
        let content = "n = 2;\nd = [| 1, 2, 3 | 4, 5, 6 |];\n";
        assert_eq!(parse_durations(content).unwrap(), vec![vec![1, 2, 3], vec![4, 5, 6]]);
    }

    #[test]
    fn test_parse_matrix_wrapped_over_lines() {
        let content = "d = [| 3,4 \n |5,2 |];";
        assert_eq!(parse_durations(content).unwrap(), vec![vec![3, 4], vec![5, 2]]);
    }

    #[test]
    fn test_parse_duration_keyword_and_trailing_lines() {
        let content = "jobs = 3;\nduration = [|\n  2, 7 |\n  1, 1 |\n  9, 4\n|];\nk = 2;\n";
        assert_eq!(
            parse_durations(content).unwrap(),
            vec![vec![2, 7], vec![1, 1], vec![9, 4]]
        );
    }

    #[test]
    fn test_ignores_similarly_named_variables() {
        let content = "durations_max = 10;\nd_total = 4;\n";
        assert!(parse_durations(content).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_cell_is_reported() {
        let err = parse_durations("d = [| 1, x |];").unwrap_err();
        assert!(matches!(err, DatasetError::InvalidCell { row: 0, ref cell } if cell == "x"));
    }

    #[tokio::test]
    async fn test_load_durations_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("t1.dzn");
        std::fs::write(&path, "d = [| 3,4 |5,2 |];\n").unwrap();

        assert_eq!(load_durations(&path).await.unwrap(), vec![vec![3, 4], vec![5, 2]]);
    }

    #[tokio::test]
    async fn test_load_durations_missing_file() {
        let err = load_durations(Path::new("/nonexistent/t1.dzn")).await.unwrap_err();
        assert!(matches!(err, DatasetError::Read { .. }));
    }
}
