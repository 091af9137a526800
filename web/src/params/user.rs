use domain::{roles::Role, Id};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct IndexParams {
    pub(crate) role: Option<Role>,
    #[param(value_type = Option<String>, format = Uuid)]
    pub(crate) cooperative_id: Option<Id>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct UpdateRoleParams {
    pub(crate) role: Role,
}
