//! Application layer - use-cases orchestrating the user domain

pub mod use_cases;

pub use use_cases::{
    CreateUserInput, CreateUserUseCase, DeleteUserUseCase, GetUserUseCase, UpdateUserInput,
    UpdateUserUseCase,
};
