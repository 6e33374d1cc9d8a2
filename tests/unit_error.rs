use pmb::error::{exit_codes, Error, JsonError};

#[test]
fn exit_codes_map_correctly() {
    let user = Error::InvalidArgument("bad".to_string());
    assert_eq!(user.exit_code(), exit_codes::USER_ERROR);

    let missing = Error::TaskNotFound("t-9".to_string());
    assert_eq!(missing.exit_code(), exit_codes::USER_ERROR);

    let rejected = Error::MutationRejected("title too short".to_string());
    assert_eq!(rejected.exit_code(), exit_codes::OPERATION_FAILED);

    let op = Error::OperationFailed("boom".to_string());
    assert_eq!(op.exit_code(), exit_codes::OPERATION_FAILED);
}

#[test]
fn json_error_includes_code() {
    let err = Error::OrganizationNotFound("acme".to_string());
    let json = JsonError::from(&err);
    assert_eq!(json.code, exit_codes::USER_ERROR);
    assert!(json.error.contains("Organization not found"));
    assert!(json.details.is_none());
}

#[test]
fn json_error_omits_empty_details() -> Result<(), Box<dyn std::error::Error>> {
    let err = Error::GraphQl("resolver exploded".to_string());
    let value = serde_json::to_value(JsonError::from(&err))?;

    assert_eq!(value["code"], exit_codes::OPERATION_FAILED);
    assert!(value.get("details").is_none());

    Ok(())
}
