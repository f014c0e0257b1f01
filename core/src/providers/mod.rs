pub mod factory;
pub mod openai;

pub use factory::create_client;
pub use openai::OpenAIClient;
