//! Judge service

use crate::{
    db::Repositories,
    error::{AppError, AppResult},
    models::{Judge, NewJudge},
};

/// Judge service for business logic
pub struct JudgeService;

impl JudgeService {
    /// Create a new, active judge
    pub async fn create_judge(repos: &Repositories, judge: NewJudge) -> AppResult<Judge> {
        let judge = repos.judges.create(&judge).await?;
        tracing::info!(judge_id = judge.id, name = %judge.name, "Judge created");
        Ok(judge)
    }

    /// Get judge by ID
    pub async fn get_judge(repos: &Repositories, id: i64) -> AppResult<Judge> {
        repos
            .judges
            .find_by_id(id)
            .await?
            .ok_or(AppError::JudgeNotFound(id))
    }

    /// List judges, active ones only unless asked otherwise
    pub async fn list_judges(repos: &Repositories, include_inactive: bool) -> AppResult<Vec<Judge>> {
        repos.judges.list(include_inactive).await
    }

    /// Activate or deactivate a judge; inactive judges cannot score
    pub async fn set_active(repos: &Repositories, id: i64, is_active: bool) -> AppResult<Judge> {
        let judge = repos
            .judges
            .set_active(id, is_active)
            .await?
            .ok_or(AppError::JudgeNotFound(id))?;

        tracing::info!(judge_id = id, is_active, "Judge activation changed");
        Ok(judge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_deactivated_judges_are_hidden_by_default() {
        let repos = Repositories::in_memory();
        let a = JudgeService::create_judge(
            &repos,
            NewJudge {
                name: "Judge A".to_string(),
                organization: None,
            },
        )
        .await
        .unwrap();
        JudgeService::create_judge(
            &repos,
            NewJudge {
                name: "Judge B".to_string(),
                organization: Some("Panel".to_string()),
            },
        )
        .await
        .unwrap();

        let deactivated = JudgeService::set_active(&repos, a.id, false).await.unwrap();
        assert!(!deactivated.is_active);

        assert_eq!(JudgeService::list_judges(&repos, false).await.unwrap().len(), 1);
        assert_eq!(JudgeService::list_judges(&repos, true).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_judge() {
        let repos = Repositories::in_memory();
        let err = JudgeService::set_active(&repos, 5, true).await.unwrap_err();
        assert_eq!(err.error_code(), "JUDGE_NOT_FOUND");
    }
}
