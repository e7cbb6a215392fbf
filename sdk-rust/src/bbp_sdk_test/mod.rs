mod mock;

pub use mock::{MockCall, MockOpenAI, MockOperation};
