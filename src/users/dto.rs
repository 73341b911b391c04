use serde::Serialize;

use crate::paging::Paging;
use crate::users::repo_types::User;

/// `{"data": ...}` envelope shared by every successful user response.
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub data: Vec<User>,
    pub paging: Paging,
}

