//! Participant service

use validator::Validate;

use crate::{
    constants::{MAX_BATCH_SIZE, QR_CODE_MAX_ATTEMPTS},
    db::Repositories,
    error::{AppError, AppResult},
    handlers::participants::{
        request::CreateParticipantRequest,
        response::{ParticipantResponse, ParticipantsListResponse},
    },
    models::{BatchReport, NewParticipant, Participant, ParticipantChanges},
    utils::generate_qr_code,
};

/// Participant service for business logic
pub struct ParticipantService;

impl ParticipantService {
    /// Register a participant under a freshly allocated QR code
    pub async fn create_participant(
        repos: &Repositories,
        participant: NewParticipant,
    ) -> AppResult<Participant> {
        if let Some(group_id) = participant.group_id {
            repos
                .groups
                .find_by_id(group_id)
                .await?
                .ok_or(AppError::GroupNotFound(group_id))?;
        }

        for attempt in 1..=QR_CODE_MAX_ATTEMPTS {
            let qr_code_id = generate_qr_code();
            if repos.participants.qr_code_exists(&qr_code_id).await? {
                tracing::debug!(attempt, "QR code collision, retrying");
                continue;
            }

            match repos.participants.create(&participant, &qr_code_id).await {
                Ok(created) => {
                    tracing::info!(
                        participant_id = created.id,
                        organization = %created.organization,
                        "Participant registered"
                    );
                    return Ok(created);
                }
                // Lost a race for the same code; draw another one.
                Err(AppError::AlreadyExists(_)) => continue,
                Err(e) => return Err(e),
            }
        }

        Err(AppError::Internal(anyhow::anyhow!(
            "no free QR code after {QR_CODE_MAX_ATTEMPTS} attempts"
        )))
    }

    /// Validate and register one request
    pub async fn register(repos: &Repositories, request: CreateParticipantRequest) -> AppResult<ParticipantResponse> {
        request.validate()?;
        let participant = Self::create_participant(repos, request.into_new_participant()?).await?;
        Ok(participant.into())
    }

    /// Register many participants; each item succeeds or fails on its own
    pub async fn batch_create(
        repos: &Repositories,
        requests: Vec<CreateParticipantRequest>,
    ) -> AppResult<BatchReport<ParticipantResponse>> {
        if requests.len() > MAX_BATCH_SIZE {
            return Err(AppError::Validation(format!(
                "At most {MAX_BATCH_SIZE} participants per batch"
            )));
        }

        let mut report = BatchReport::new();
        for (index, request) in requests.into_iter().enumerate() {
            match Self::register(repos, request).await {
                Err(e) if !e.is_domain() => return Err(e),
                result => report.record(index, result),
            }
        }

        tracing::info!(
            success_count = report.success_count,
            error_count = report.error_count,
            "Batch participant registration finished"
        );
        Ok(report)
    }

    /// Get participant by ID
    pub async fn get_participant(repos: &Repositories, id: i64) -> AppResult<Participant> {
        repos
            .participants
            .find_by_id(id)
            .await?
            .ok_or(AppError::ParticipantNotFound(id))
    }

    /// Page through participants
    pub async fn list_participants(
        repos: &Repositories,
        page: u32,
        per_page: u32,
        search: Option<String>,
    ) -> AppResult<ParticipantsListResponse> {
        let offset = (page.saturating_sub(1) as i64) * per_page as i64;
        let search = search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let (participants, total) = repos
            .participants
            .list(offset, per_page as i64, search)
            .await?;

        Ok(ParticipantsListResponse {
            participants: participants.into_iter().map(Into::into).collect(),
            total,
            page,
            per_page,
        })
    }

    /// Update participant details; a new phone also refreshes the suffix
    pub async fn update_participant(
        repos: &Repositories,
        id: i64,
        changes: ParticipantChanges,
    ) -> AppResult<Participant> {
        if changes.is_empty() {
            return Self::get_participant(repos, id).await;
        }

        let participant = repos
            .participants
            .update(id, &changes)
            .await?
            .ok_or(AppError::ParticipantNotFound(id))?;

        tracing::info!(participant_id = id, "Participant updated");
        Ok(participant)
    }

    /// Participants not yet placed in any group
    pub async fn list_ungrouped(repos: &Repositories) -> AppResult<Vec<ParticipantResponse>> {
        let participants = repos.participants.list_ungrouped().await?;
        Ok(participants.into_iter().map(Into::into).collect())
    }

    /// Participants of one organization
    pub async fn list_by_organization(
        repos: &Repositories,
        organization: &str,
    ) -> AppResult<Vec<ParticipantResponse>> {
        let participants = repos
            .participants
            .list_by_organization(organization.trim())
            .await?;
        Ok(participants.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, phone: &str) -> CreateParticipantRequest {
        CreateParticipantRequest {
            name: name.to_string(),
            organization: "Org".to_string(),
            phone: phone.to_string(),
            group_id: None,
        }
    }

    #[tokio::test]
    async fn test_create_derives_suffix_and_qr_code() {
        let repos = Repositories::in_memory();
        let participant = ParticipantService::create_participant(
            &repos,
            request("张三", "13812345678").into_new_participant().unwrap(),
        )
        .await
        .unwrap();

        assert_eq!(participant.phone_last4, "5678");
        assert_eq!(participant.qr_code_id.len(), 8);
        assert!(!participant.is_checked_in);
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_group() {
        let repos = Repositories::in_memory();
        let mut new = request("A", "13812345678").into_new_participant().unwrap();
        new.group_id = Some(99);

        let err = ParticipantService::create_participant(&repos, new)
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "GROUP_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_batch_reports_per_index() {
        let repos = Repositories::in_memory();
        let report = ParticipantService::batch_create(
            &repos,
            vec![
                request("A", "13800000001"),
                request("B", "12"),
                request(" ", "13800000003"),
                request("D", "13800000004"),
            ],
        )
        .await
        .unwrap();

        assert_eq!(report.success_count, 2);
        assert_eq!(report.failed_indices(), vec![1, 2]);
        assert_eq!(repos.participants.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_update_recomputes_suffix() {
        let repos = Repositories::in_memory();
        let created = ParticipantService::create_participant(
            &repos,
            request("A", "13812345678").into_new_participant().unwrap(),
        )
        .await
        .unwrap();

        let updated = ParticipantService::update_participant(
            &repos,
            created.id,
            ParticipantChanges {
                phone: Some("13900001111".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.phone_last4, "1111");
        assert_eq!(updated.name, "A");
    }

    #[tokio::test]
    async fn test_list_searches_and_pages() {
        let repos = Repositories::in_memory();
        for (name, phone) in [("Alice", "13800000001"), ("Bob", "13800000002"), ("Alicia", "13800000003")] {
            ParticipantService::create_participant(
                &repos,
                request(name, phone).into_new_participant().unwrap(),
            )
            .await
            .unwrap();
        }

        let page = ParticipantService::list_participants(&repos, 1, 1, Some("ali".to_string()))
            .await
            .unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.participants.len(), 1);
        assert_eq!(page.participants[0].name, "Alice");
    }
}
