//! Recomputes stored project progress from the phase detail trees.
//!
//! Handlers that change completion state or tree shape mirror their row
//! mutation onto the in-memory forest (via the pure ops in `tree`) and hand
//! the result here, so the roll-up sees the post-mutation state without a
//! refetch. The stored value is a cache of the derived number; failing to
//! write it is logged and never fails the triggering request.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::{debug, warn};

use crate::database::entities::{
    phase_details, phase_details::Entity as PhaseDetails, project_phases,
    project_phases::Entity as ProjectPhases, projects, projects::Entity as Projects,
};
use crate::progress::{phase_contribution, project_progress, PhaseStatus};
use crate::tree::{build_forest, FlatRecord, TreeNode};

pub struct ProgressService {
    db: DatabaseConnection,
}

impl ProgressService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Builds the detail forest for one phase from storage.
    pub async fn phase_forest(&self, phase_id: i32) -> Result<Vec<TreeNode>, DbErr> {
        let rows = PhaseDetails::find()
            .filter(phase_details::Column::PhaseId.eq(phase_id))
            .order_by_asc(phase_details::Column::SortOrder)
            .order_by_asc(phase_details::Column::Id)
            .all(&self.db)
            .await?;

        let records: Vec<FlatRecord> = rows.iter().map(|row| row.as_flat_record()).collect();
        Ok(build_forest(&records))
    }

    /// Recomputes and stores a project's progress from storage alone.
    pub async fn recompute_project(&self, project_id: i32) -> Result<i32, DbErr> {
        self.recompute(project_id, None).await
    }

    /// Same, but uses `forest` in place of the stored rows for `phase_id`;
    /// the caller already holds the post-mutation tree.
    pub async fn recompute_project_with(
        &self,
        project_id: i32,
        phase_id: i32,
        forest: &[TreeNode],
    ) -> Result<i32, DbErr> {
        self.recompute(project_id, Some((phase_id, forest))).await
    }

    async fn recompute(
        &self,
        project_id: i32,
        substitute: Option<(i32, &[TreeNode])>,
    ) -> Result<i32, DbErr> {
        let phases = ProjectPhases::find()
            .filter(project_phases::Column::ProjectId.eq(project_id))
            .order_by_asc(project_phases::Column::SortOrder)
            .order_by_asc(project_phases::Column::Id)
            .all(&self.db)
            .await?;

        let mut contributions = Vec::with_capacity(phases.len());
        for phase in &phases {
            let status = PhaseStatus::parse(&phase.status).unwrap_or_default();
            let contribution = match substitute {
                Some((id, forest)) if id == phase.id => phase_contribution(status, forest),
                _ => {
                    let forest = self.phase_forest(phase.id).await?;
                    phase_contribution(status, &forest)
                }
            };
            contributions.push(contribution);
        }

        let value = project_progress(&contributions);

        if let Some(project) = Projects::find_by_id(project_id).one(&self.db).await? {
            let mut project: projects::ActiveModel = project.into();
            project.progress = Set(value);
            project.update(&self.db).await?;
        }

        debug!(project_id, progress = value, "stored recomputed progress");
        Ok(value)
    }

    /// Fire-and-forget variant: failures are logged, not propagated.
    pub async fn push_project(&self, project_id: i32) {
        if let Err(err) = self.recompute_project(project_id).await {
            warn!(%err, project_id, "progress push failed");
        }
    }

    /// Fire-and-forget variant of [`recompute_project_with`].
    pub async fn push_project_with(&self, project_id: i32, phase_id: i32, forest: &[TreeNode]) {
        if let Err(err) = self.recompute_project_with(project_id, phase_id, forest).await {
            warn!(%err, project_id, phase_id, "progress push failed");
        }
    }
}
