pub mod applicant;
pub mod customer;
pub mod group;
pub mod policy;
pub mod quote;
pub mod template;
pub mod user;

pub use applicant::{Applicant, CreateApplicant, NewApplicant};
pub use customer::{CreateCustomer, Customer, NewCustomer};
pub use group::{CreateGroup, Group, NewGroup};
pub use policy::{
    CreateGroupPolicy, CreateIndividualPolicy, GroupPolicy, IndividualPolicy, NewGroupPolicy, NewIndividualPolicy,
    PolicyBook, PolicyStatus,
};
pub use quote::{CreateQuote, NewQuote, Quote, QuoteStatus};
pub use template::{CreateTemplate, NewTemplate, Template, TemplateQuery, TemplateStatus};
pub use user::{CreateUser, NewUser, User, UserWithRoles};
