//! Structured generation parameters.
//!
//! The host triggers `generate` with seven positional arguments. They are
//! validated here, before any process launch, and serialized back out as
//! discrete command-line arguments matching the generator's argparse flags.

use thiserror::Error;

/// Errors in the parameters of a generation request
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("missing parameter: {0}")]
    Missing(&'static str),

    #[error("parameter {field} is not numeric: {value:?}")]
    NotNumeric { field: &'static str, value: String },

    #[error("parameter {field} must be a positive count")]
    NotPositive { field: &'static str },

    #[error("hexagram must not be empty")]
    EmptyHexagram,

    #[error("expected 7 parameters, got {0}")]
    TooManyParameters(usize),
}

/// Parameters for one generation job.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub generations: u32,
    pub population: u32,
    pub hexagram: String,
    pub base_duration: f64,
    pub mutation_rate: f64,
    pub harmonicity_ratio: f64,
    pub dynamic_ratio: f64,
}

impl GenerationRequest {
    /// Parse the seven positional arguments of the inbound `generate`
    /// message: generations, population, hexagram, base duration, mutation
    /// rate, harmonicity ratio, dynamic ratio.
    ///
    /// Absent or non-numeric values are validation errors, never defaults.
    pub fn from_args(args: &[String]) -> Result<Self, ValidationError> {
        if args.len() > 7 {
            return Err(ValidationError::TooManyParameters(args.len()));
        }

        let request = Self {
            generations: parse_count(args, 0, "generations")?,
            population: parse_count(args, 1, "population")?,
            hexagram: positional(args, 2, "hexagram")?.to_string(),
            base_duration: parse_number(args, 3, "base_duration")?,
            mutation_rate: parse_number(args, 4, "mutation_rate")?,
            harmonicity_ratio: parse_number(args, 5, "harmonicity_ratio")?,
            dynamic_ratio: parse_number(args, 6, "dynamic_ratio")?,
        };
        request.validate()?;
        Ok(request)
    }

    /// Check the invariants that survive parsing: a non-empty hexagram and
    /// finite numeric fields.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.hexagram.trim().is_empty() {
            return Err(ValidationError::EmptyHexagram);
        }
        for (field, value) in [
            ("base_duration", self.base_duration),
            ("mutation_rate", self.mutation_rate),
            ("harmonicity_ratio", self.harmonicity_ratio),
            ("dynamic_ratio", self.dynamic_ratio),
        ] {
            if !value.is_finite() {
                return Err(ValidationError::NotNumeric {
                    field,
                    value: value.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Discrete argument list for the generator process. Each parameter is
    /// its own argument; nothing is ever interpolated into a shell string.
    pub fn to_args(&self) -> Vec<String> {
        vec![
            "--generations".to_string(),
            self.generations.to_string(),
            "--population".to_string(),
            self.population.to_string(),
            "--hexagram".to_string(),
            self.hexagram.clone(),
            "--base_duration".to_string(),
            self.base_duration.to_string(),
            "--mutation_rate".to_string(),
            self.mutation_rate.to_string(),
            "--harmonicity_ratio".to_string(),
            self.harmonicity_ratio.to_string(),
            "--dynamic_ratio".to_string(),
            self.dynamic_ratio.to_string(),
        ]
    }
}

fn positional<'a>(
    args: &'a [String],
    index: usize,
    field: &'static str,
) -> Result<&'a str, ValidationError> {
    args.get(index)
        .map(String::as_str)
        .ok_or(ValidationError::Missing(field))
}

fn parse_count(
    args: &[String],
    index: usize,
    field: &'static str,
) -> Result<u32, ValidationError> {
    let raw = positional(args, index, field)?;
    let value: i64 = raw.parse().map_err(|_| ValidationError::NotNumeric {
        field,
        value: raw.to_string(),
    })?;
    u32::try_from(value)
        .ok()
        .filter(|count| *count > 0)
        .ok_or(ValidationError::NotPositive { field })
}

fn parse_number(
    args: &[String],
    index: usize,
    field: &'static str,
) -> Result<f64, ValidationError> {
    let raw = positional(args, index, field)?;
    let value: f64 = raw.parse().map_err(|_| ValidationError::NotNumeric {
        field,
        value: raw.to_string(),
    })?;
    if !value.is_finite() {
        return Err(ValidationError::NotNumeric {
            field,
            value: raw.to_string(),
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn test_from_args_happy_path() {
        let request = GenerationRequest::from_args(&args(&[
            "12", "30", "43", "480", "0.05", "0.7", "0.5",
        ]))
        .unwrap();

        assert_eq!(request.generations, 12);
        assert_eq!(request.population, 30);
        assert_eq!(request.hexagram, "43");
        assert_eq!(request.base_duration, 480.0);
        assert_eq!(request.mutation_rate, 0.05);
    }

    #[test]
    fn test_missing_parameter() {
        let result = GenerationRequest::from_args(&args(&["12", "30", "43"]));
        assert_eq!(result, Err(ValidationError::Missing("base_duration")));
    }

    #[test]
    fn test_non_numeric_count() {
        let result =
            GenerationRequest::from_args(&args(&["many", "30", "43", "480", "0.05", "0.7", "0.5"]));
        assert_eq!(
            result,
            Err(ValidationError::NotNumeric {
                field: "generations",
                value: "many".to_string(),
            })
        );
    }

    #[test]
    fn test_non_numeric_ratio() {
        let result =
            GenerationRequest::from_args(&args(&["12", "30", "43", "480", "fast", "0.7", "0.5"]));
        assert_eq!(
            result,
            Err(ValidationError::NotNumeric {
                field: "mutation_rate",
                value: "fast".to_string(),
            })
        );
    }

    #[test]
    fn test_zero_count_rejected() {
        let result =
            GenerationRequest::from_args(&args(&["0", "30", "43", "480", "0.05", "0.7", "0.5"]));
        assert_eq!(result, Err(ValidationError::NotPositive { field: "generations" }));
    }

    #[test]
    fn test_empty_hexagram_rejected() {
        let result =
            GenerationRequest::from_args(&args(&["12", "30", " ", "480", "0.05", "0.7", "0.5"]));
        assert_eq!(result, Err(ValidationError::EmptyHexagram));
    }

    #[test]
    fn test_to_args_is_discrete_flag_value_pairs() {
        let request = GenerationRequest::from_args(&args(&[
            "12", "30", "43", "480", "0.05", "0.7", "0.5",
        ]))
        .unwrap();

        let rendered = request.to_args();
        assert_eq!(rendered.len(), 14);
        assert_eq!(rendered[0], "--generations");
        assert_eq!(rendered[1], "12");
        assert_eq!(rendered[4], "--hexagram");
        assert_eq!(rendered[5], "43");
        assert_eq!(rendered[12], "--dynamic_ratio");
        assert_eq!(rendered[13], "0.5");
    }

    #[test]
    fn test_extra_parameters_rejected() {
        let result = GenerationRequest::from_args(&args(&[
            "12", "30", "43", "480", "0.05", "0.7", "0.5", "surprise",
        ]));
        assert_eq!(result, Err(ValidationError::TooManyParameters(8)));
    }
}
