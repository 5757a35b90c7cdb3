pub mod mock_location;
pub mod prepare_env;
