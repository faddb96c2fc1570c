use anyhow::{Result, bail};

/// Parse a comma-separated list of tick positions (`"1.5,1,0.5"`).
///
/// Every entry must be a finite number; empty entries are rejected.
pub fn parse_tick_list(s: &str) -> Result<Vec<f64>> {
    let mut out = Vec::new();
    for (i, raw) in s.split(',').enumerate() {
        let entry = raw.trim();
        if entry.is_empty() {
            bail!("empty entry at position {} in '{s}'", i + 1);
        }
        let v: f64 = match entry.parse() {
            Ok(v) => v,
            Err(_) => bail!("'{entry}' is not a number"),
        };
        if !v.is_finite() {
            bail!("'{entry}' is not finite");
        }
        out.push(v);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_in_given_order() {
        assert_eq!(parse_tick_list("1, 0.1,0.01").unwrap(), vec![1.0, 0.1, 0.01]);
        assert_eq!(parse_tick_list("2").unwrap(), vec![2.0]);
    }

    #[test]
    fn rejects_malformed_lists() {
        for bad in ["", "1,,2", "1,abc", "1,", "inf", "1,NaN"] {
            assert!(parse_tick_list(bad).is_err(), "accepted {bad:?}");
        }
    }
}
