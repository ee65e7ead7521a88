use crate::utils::error::{DriverError, Result};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_positive_number(field_name: &str, value: u32, min_value: u32) -> Result<()> {
    if value < min_value {
        return Err(DriverError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| DriverError::MissingConfigError {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(DriverError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("baud_rate", 9600, 1).is_ok());
        assert!(validate_positive_number("baud_rate", 0, 1).is_err());
    }

    #[test]
    fn test_validate_non_empty_string() {
        assert!(validate_non_empty_string("port", "/dev/ttyUSB0").is_ok());
        assert!(validate_non_empty_string("port", "").is_err());
        assert!(validate_non_empty_string("port", "   ").is_err());
    }

    #[test]
    fn test_validate_required_field() {
        let present = Some(9600u32);
        assert_eq!(*validate_required_field("baud_rate", &present).unwrap(), 9600);

        let missing: Option<u32> = None;
        match validate_required_field("baud_rate", &missing) {
            Err(DriverError::MissingConfigError { field }) => assert_eq!(field, "baud_rate"),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
