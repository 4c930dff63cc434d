use std::fmt;
use std::io;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Parameters of a directional derivative.
///
/// They are only read while a pipeline executes, so they can be changed
/// freely between two executions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct DerivativeParameters {
    /// Which derivative to take: 1 for the first, 2 for the second, ...
    pub order: u32,

    /// Truncation error is `O(h^(2 * order_of_accuracy))`, must be at
    /// least 1.
    pub order_of_accuracy: u32,

    /// Direction of differentiation, in `0..D`.
    pub axis: usize,

    /// Divide by `spacing[axis]^order` to get a physical-space derivative.
    pub use_spacing: bool,
}

impl Default for DerivativeParameters {
    fn default() -> Self {
        DerivativeParameters {
            order: 1,
            order_of_accuracy: 2,
            axis: 0,
            use_spacing: true,
        }
    }
}

impl fmt::Display for DerivativeParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Order: {}", self.order)?;
        writeln!(f, "OrderOfAccuracy: {}", self.order_of_accuracy)?;
        writeln!(f, "Axis: {}", self.axis)?;
        write!(f, "UseSpacing: {}", self.use_spacing)
    }
}

/// Reads one parameter set per CSV row.
///
/// The header names the columns (`order`, `order_of_accuracy`, `axis`,
/// `use_spacing`); columns may be omitted and then take their default.
pub fn read_parameter_table(reader: impl io::Read) -> Result<Vec<DerivativeParameters>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut table = Vec::new();
    for record in reader.deserialize() {
        table.push(record?);
    }

    Ok(table)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::DerivativeError;

    #[test]
    fn test_defaults() {
        let parameters = DerivativeParameters::default();

        assert_eq!(parameters.order, 1);
        assert_eq!(parameters.order_of_accuracy, 2);
        assert_eq!(parameters.axis, 0);
        assert!(parameters.use_spacing);
    }

    #[test]
    fn test_parse_table() {
        let csv = "order,order_of_accuracy,axis,use_spacing
            2,1,0,true
            1,4,2,false";

        let table = read_parameter_table(csv.as_bytes()).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(
            table[1],
            DerivativeParameters {
                order: 1,
                order_of_accuracy: 4,
                axis: 2,
                use_spacing: false,
            }
        );
    }

    #[test]
    fn test_missing_columns_take_defaults() {
        let csv = "axis,order\n1,2\n";

        let table = read_parameter_table(csv.as_bytes()).unwrap();

        assert_eq!(
            table,
            vec![DerivativeParameters {
                order: 2,
                axis: 1,
                ..Default::default()
            }]
        );
    }

    #[test]
    fn test_malformed_table() {
        let csv = "order,axis\nsecond,0\n";

        assert!(matches!(
            read_parameter_table(csv.as_bytes()),
            Err(DerivativeError::Table(_))
        ));
    }

    #[test]
    fn test_display() {
        let text = DerivativeParameters::default().to_string();

        assert_eq!(text, "Order: 1\nOrderOfAccuracy: 2\nAxis: 0\nUseSpacing: true");
    }
}
