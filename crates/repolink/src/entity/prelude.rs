//! Common re-exports for convenient entity usage.

pub use super::github_repository::{
    ActiveModel as GitHubRepositoryActiveModel, Column as GitHubRepositoryColumn,
    Entity as GitHubRepository, Model as GitHubRepositoryModel,
};
pub use super::linked_account::{
    ActiveModel as LinkedAccountActiveModel, Column as LinkedAccountColumn,
    Entity as LinkedAccount, Model as LinkedAccountModel,
};
pub use super::user::{
    ActiveModel as UserActiveModel, Column as UserColumn, Entity as User, Model as UserModel,
};
pub use super::user_repository::{
    ActiveModel as UserRepositoryActiveModel, Column as UserRepositoryColumn,
    Entity as UserRepository, Model as UserRepositoryModel,
};
