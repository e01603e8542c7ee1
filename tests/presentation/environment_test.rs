use orator::presentation::Environment;

#[test]
fn given_known_aliases_when_parsing_environment_then_maps_to_variants() {
    assert_eq!(Environment::try_from("production".to_string()), Ok(Environment::Prod));
    assert_eq!(Environment::try_from(" Dev ".to_string()), Ok(Environment::Local));
    assert_eq!(Environment::try_from("test".to_string()), Ok(Environment::Test));
}

#[test]
fn given_unknown_environment_when_parsing_then_returns_error() {
    assert!(Environment::try_from("staging".to_string()).is_err());
}
