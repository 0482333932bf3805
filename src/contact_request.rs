use serde::Serialize;

use crate::{
    app::{
        ArcContactRequestRepository, ArcEmailService, ArcProfileRepository, ServiceError,
        ServiceResult,
    },
    profile::ProfileId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(RequestStatus::Pending),
            "approved" => Some(RequestStatus::Approved),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ContactRequest {
    pub id: i64,
    pub profile_id: ProfileId,
    pub requester_email: String,
    pub status: RequestStatus,
    pub created_at: i64,
}

#[derive(Clone, Debug)]
pub struct NewContactRequest {
    pub profile_id: ProfileId,
    pub requester_email: String,
    pub created_at: i64,
}

/// A contact request joined to its target biodata. The target's contact
/// details stay hidden until an admin approves the request.
#[derive(Clone, Debug)]
pub struct ContactRequestView {
    pub id: i64,
    pub profile_id: ProfileId,
    pub requester_email: String,
    pub status: RequestStatus,
    pub created_at: i64,
    pub name: Option<String>,
    pub contact_email: Option<String>,
    pub mobile_number: Option<String>,
}

pub trait ContactRequestService {
    fn create(&self, requester_email: &str, profile_id: ProfileId) -> ServiceResult<i64>;
    fn list_for(&self, requester_email: &str) -> ServiceResult<Vec<ContactRequestView>>;
    fn pending(&self) -> ServiceResult<Vec<ContactRequestView>>;
    fn approve(&self, id: i64) -> ServiceResult<usize>;
    fn remove_own(&self, id: i64, requester_email: &str) -> ServiceResult<usize>;
    fn count_pending(&self) -> ServiceResult<usize>;
}

pub struct ContactRequestServiceImpl {
    contact_request_repository: ArcContactRequestRepository,
    profile_repository: ArcProfileRepository,
    email_service: ArcEmailService,
}

impl ContactRequestServiceImpl {
    pub fn new(
        contact_request_repository: ArcContactRequestRepository,
        profile_repository: ArcProfileRepository,
        email_service: ArcEmailService,
    ) -> Self {
        Self {
            contact_request_repository,
            profile_repository,
            email_service,
        }
    }

    fn build_view(&self, request: &ContactRequest) -> ServiceResult<ContactRequestView> {
        let profile = self.profile_repository.get_by_id(request.profile_id)?;
        let (contact_email, mobile_number) = match (&profile, request.status) {
            (Some(profile), RequestStatus::Approved) => (
                Some(profile.contact_email.clone()),
                Some(profile.mobile_number.clone()),
            ),
            _ => (None, None),
        };
        Ok(ContactRequestView {
            id: request.id,
            profile_id: request.profile_id,
            requester_email: request.requester_email.clone(),
            status: request.status,
            created_at: request.created_at,
            name: profile.map(|p| p.name),
            contact_email,
            mobile_number,
        })
    }
}

impl ContactRequestService for ContactRequestServiceImpl {
    fn create(&self, requester_email: &str, profile_id: ProfileId) -> ServiceResult<i64> {
        if self.profile_repository.get_by_id(profile_id)?.is_none() {
            return ServiceError::not_found(format!("No biodata with id {}", profile_id));
        }
        let id = self.contact_request_repository.insert(&NewContactRequest {
            profile_id,
            requester_email: requester_email.to_string(),
            created_at: chrono::Utc::now().timestamp(),
        })?;
        Ok(id)
    }

    fn list_for(&self, requester_email: &str) -> ServiceResult<Vec<ContactRequestView>> {
        let requests = self
            .contact_request_repository
            .list_by_requester(requester_email)?;
        requests.iter().map(|r| self.build_view(r)).collect()
    }

    fn pending(&self) -> ServiceResult<Vec<ContactRequestView>> {
        let requests = self.contact_request_repository.list_pending()?;
        requests.iter().map(|r| self.build_view(r)).collect()
    }

    fn approve(&self, id: i64) -> ServiceResult<usize> {
        let matched = self.contact_request_repository.approve(id)?;
        if matched > 0 {
            if let Some(request) = self.contact_request_repository.get_by_id(id)? {
                self.email_service.send(
                    &request.requester_email,
                    "Contact request approved",
                    &format!(
                        "Your contact request for biodata {} has been approved. The member's contact details are now visible in your dashboard.",
                        request.profile_id
                    ),
                );
            }
        }
        Ok(matched)
    }

    fn remove_own(&self, id: i64, requester_email: &str) -> ServiceResult<usize> {
        let deleted = self
            .contact_request_repository
            .delete_own(id, requester_email)?;
        Ok(deleted)
    }

    fn count_pending(&self) -> ServiceResult<usize> {
        let count = self.contact_request_repository.count_pending()?;
        Ok(count)
    }
}
