/// ルート定義
///
/// HTTPメソッドとリソーステンプレートの組から操作を決定する。
/// PUTとPATCHはどちらも部分更新として扱う。
use super::request::ApiRequest;

/// APIの操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    CreateGroup,
    ListGroups,
    GetGroup,
    UpdateGroup,
    DeleteGroup,
    JoinGroup,
    LeaveGroup,
    ListMembers,
    UpdateMembership,
    CreateEvent,
    ListEvents,
    GetEvent,
    UpdateEvent,
    DeleteEvent,
    Register,
    Unregister,
    CreateTraining,
    ListTrainings,
    RecordPerformance,
    ListPerformances,
    PresignUpload,
    MyGroups,
    MyEvents,
}

impl Route {
    /// メソッドとリソーステンプレートからルートを解決
    pub fn resolve(method: &str, resource: &str) -> Option<Self> {
        let resource = match resource.trim_end_matches('/') {
            "" => "/",
            trimmed => trimmed,
        };

        let route = match (method, resource) {
            ("POST", "/groups") => Route::CreateGroup,
            ("GET", "/groups") => Route::ListGroups,
            ("GET", "/groups/{groupId}") => Route::GetGroup,
            ("PUT" | "PATCH", "/groups/{groupId}") => Route::UpdateGroup,
            ("DELETE", "/groups/{groupId}") => Route::DeleteGroup,

            ("POST", "/groups/{groupId}/memberships") => Route::JoinGroup,
            ("DELETE", "/groups/{groupId}/memberships") => Route::LeaveGroup,
            ("GET", "/groups/{groupId}/memberships") => Route::ListMembers,
            ("PUT" | "PATCH", "/groups/{groupId}/memberships/{userId}") => {
                Route::UpdateMembership
            }

            ("POST", "/groups/{groupId}/events") => Route::CreateEvent,
            ("GET", "/groups/{groupId}/events") => Route::ListEvents,
            ("GET", "/groups/{groupId}/events/{eventId}") => Route::GetEvent,
            ("PUT" | "PATCH", "/groups/{groupId}/events/{eventId}") => Route::UpdateEvent,
            ("DELETE", "/groups/{groupId}/events/{eventId}") => Route::DeleteEvent,

            ("POST", "/groups/{groupId}/events/{eventId}/registrations") => Route::Register,
            ("DELETE", "/groups/{groupId}/events/{eventId}/registrations") => Route::Unregister,

            ("POST", "/groups/{groupId}/trainings") => Route::CreateTraining,
            ("GET", "/groups/{groupId}/trainings") => Route::ListTrainings,
            ("POST", "/groups/{groupId}/trainings/{trainingId}/performances") => {
                Route::RecordPerformance
            }
            ("GET", "/groups/{groupId}/trainings/{trainingId}/performances") => {
                Route::ListPerformances
            }

            ("POST", "/uploads/{resource}") => Route::PresignUpload,
            ("GET", "/users/me/groups") => Route::MyGroups,
            ("GET", "/users/me/events") => Route::MyEvents,

            _ => return None,
        };

        Some(route)
    }

    pub fn from_request(request: &ApiRequest) -> Option<Self> {
        Self::resolve(&request.method, &request.resource)
    }

    /// 状態を変更する操作か
    pub fn is_mutation(&self) -> bool {
        !matches!(
            self,
            Route::ListGroups
                | Route::GetGroup
                | Route::ListMembers
                | Route::ListEvents
                | Route::GetEvent
                | Route::ListTrainings
                | Route::ListPerformances
                | Route::MyGroups
                | Route::MyEvents
        )
    }
}
