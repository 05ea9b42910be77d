use validator::Validate;

use crate::error::{AppError, AppResult};

/// Run derive-based validation and fold the first failure into a 400.
pub fn validate_payload<T: Validate>(payload: &T) -> AppResult<()> {
    payload.validate().map_err(|errs| {
        let message = errs
            .field_errors()
            .iter()
            .flat_map(|(_, errors)| errors.iter())
            .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
            .next()
            .unwrap_or_else(|| "invalid request".to_string());
        AppError::Validation(message)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CreateShipmentRequest;

    fn base_request() -> CreateShipmentRequest {
        CreateShipmentRequest {
            name: "Laptop".into(),
            category: None,
            description: None,
            price: 999.0,
            sender: "Alice".into(),
            receiver: "Bob".into(),
            from_location: "Berlin".into(),
            to_location: "Paris".into(),
            address: None,
            priority: None,
            from_lat: None,
            from_lng: None,
            to_lat: None,
            to_lng: None,
        }
    }

    #[test]
    fn negative_price_is_rejected() {
        let mut req = base_request();
        req.price = -1.0;
        let err = validate_payload(&req).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn empty_name_is_rejected() {
        let mut req = base_request();
        req.name = String::new();
        assert!(validate_payload(&req).is_err());
    }

    #[test]
    fn well_formed_request_passes() {
        assert!(validate_payload(&base_request()).is_ok());
    }
}
