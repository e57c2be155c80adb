// src/quiz/mod.rs

pub mod bank;
pub mod engine;
pub mod resolver;
pub mod session;

pub use bank::QuestionBank;
pub use engine::{ActionOutcome, QuizEngine};
pub use resolver::QuestionResolver;
