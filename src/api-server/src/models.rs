use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use edunet_authz::{LearningGroup, ListFilter, SubProgram, Visibility};

/// Query parameters for subprogram listing
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct SubProgramListQuery {
    /// Explicit learning-center filter (verified against the caller's scope)
    pub lc_id: Option<u64>,

    /// Explicit master-franchisee filter (verified against the caller's scope)
    pub mf_id: Option<u64>,

    pub program_id: Option<u64>,

    pub status: Option<String>,

    /// Case-insensitive name search
    pub search: Option<String>,

    pub pricing_model: Option<String>,

    pub page: Option<usize>,

    pub per_page: Option<usize>,
}

impl SubProgramListQuery {
    pub fn to_filter(&self) -> ListFilter {
        ListFilter {
            lc_id: self.lc_id,
            mf_id: self.mf_id,
            program_id: self.program_id,
            status: self.status.clone(),
            search: self.search.clone(),
            pricing_model: self.pricing_model.clone(),
        }
    }
}

/// Query parameters for learning-group listing
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct LearningGroupListQuery {
    /// Explicit learning-center filter (verified against the caller's scope)
    pub lc_id: Option<u64>,

    /// Explicit master-franchisee filter (verified against the caller's scope)
    pub mf_id: Option<u64>,

    pub status: Option<String>,

    pub search: Option<String>,

    pub page: Option<usize>,

    pub per_page: Option<usize>,
}

impl LearningGroupListQuery {
    pub fn to_filter(&self) -> ListFilter {
        ListFilter {
            lc_id: self.lc_id,
            mf_id: self.mf_id,
            program_id: None,
            status: self.status.clone(),
            search: self.search.clone(),
            pricing_model: None,
        }
    }
}

/// Subprogram creation request
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateSubProgramRequest {
    pub program_id: u64,

    #[validate(length(min = 1, max = 255))]
    pub name: String,

    /// Lifecycle status; defaults to "active"
    #[serde(default = "default_status")]
    pub status: String,

    pub pricing_model: Option<String>,

    /// Defaults to PRIVATE
    #[serde(default)]
    #[schema(value_type = String, example = "SHARED")]
    pub visibility: Visibility,

    /// MF allow-list, consulted only when visibility is SHARED
    #[serde(default)]
    pub shared_with_mfs: Vec<u64>,

    /// LC allow-list, consulted only when visibility is SHARED
    #[serde(default)]
    pub shared_with_lcs: Vec<u64>,
}

fn default_status() -> String {
    "active".to_string()
}

/// Subprogram update request; absent fields are left unchanged
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateSubProgramRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,

    pub status: Option<String>,

    pub pricing_model: Option<String>,

    #[schema(value_type = Option<String>, example = "PUBLIC")]
    pub visibility: Option<Visibility>,

    pub shared_with_mfs: Option<Vec<u64>>,

    pub shared_with_lcs: Option<Vec<u64>>,
}

/// Subprogram response body
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubProgramResponse {
    pub id: u64,
    pub program_id: u64,
    pub name: String,
    pub status: String,
    pub pricing_model: Option<String>,
    pub mf_id: Option<u64>,
    pub created_by: u64,
    #[schema(value_type = String, example = "PRIVATE")]
    pub visibility: Visibility,
    pub shared_with_mfs: Vec<u64>,
    pub shared_with_lcs: Vec<u64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<SubProgram> for SubProgramResponse {
    fn from(sp: SubProgram) -> Self {
        Self {
            id: sp.id,
            program_id: sp.program_id,
            name: sp.name,
            status: sp.status,
            pricing_model: sp.pricing_model,
            mf_id: sp.mf_id,
            created_by: sp.created_by,
            visibility: sp.visibility,
            shared_with_mfs: sp.shared_with_mfs.into_iter().collect(),
            shared_with_lcs: sp.shared_with_lcs.into_iter().collect(),
            created_at: sp.created_at,
        }
    }
}

/// Paginated subprogram listing
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubProgramListResponse {
    pub items: Vec<SubProgramResponse>,
    pub total: usize,
    pub page: usize,
    pub per_page: usize,
}

/// Learning-group creation request.
///
/// The group's `mf_id`/`hq_id` are derived from the creating LC's
/// ancestry; callers cannot supply them.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateLearningGroupRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,

    /// Lifecycle status; defaults to "active"
    #[serde(default = "default_status")]
    pub status: String,
}

/// Learning-group response body
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LearningGroupResponse {
    pub id: u64,
    pub name: String,
    pub status: String,
    pub lc_id: u64,
    pub mf_id: u64,
    pub hq_id: u64,
    pub created_by: u64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<LearningGroup> for LearningGroupResponse {
    fn from(lg: LearningGroup) -> Self {
        Self {
            id: lg.id,
            name: lg.name,
            status: lg.status,
            lc_id: lg.lc_id,
            mf_id: lg.mf_id,
            hq_id: lg.hq_id,
            created_by: lg.created_by,
            created_at: lg.created_at,
        }
    }
}

/// Paginated learning-group listing
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LearningGroupListResponse {
    pub items: Vec<LearningGroupResponse>,
    pub total: usize,
    pub page: usize,
    pub per_page: usize,
}

/// Error response body
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub status: u16,
}
