use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create departments table
        manager
            .create_table(
                Table::create()
                    .table(Departments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Departments::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Departments::Name)
                            .string_len(120)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Departments::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Create users table
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Name).string_len(120).not_null())
                    .col(
                        ColumnDef::new(Users::Email)
                            .string_len(160)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::PasswordHash).string_len(255).not_null())
                    .col(ColumnDef::new(Users::Role).string_len(20).not_null())
                    .col(ColumnDef::new(Users::DepartmentId).integer())
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-users-department_id")
                            .from(Users::Table, Users::DepartmentId)
                            .to(Departments::Table, Departments::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Create projects table
        manager
            .create_table(
                Table::create()
                    .table(Projects::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Projects::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Projects::Title).string_len(200).not_null())
                    .col(ColumnDef::new(Projects::Status).string_len(20).not_null())
                    .col(ColumnDef::new(Projects::Priority).string_len(20).not_null())
                    .col(
                        ColumnDef::new(Projects::Progress)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Projects::OwnerId).integer())
                    .col(ColumnDef::new(Projects::DepartmentId).integer())
                    .col(ColumnDef::new(Projects::StartDate).timestamp_with_time_zone())
                    .col(ColumnDef::new(Projects::EndDate).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Projects::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Projects::TotalBudget)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(Projects::SpentAmount)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-projects-owner_id")
                            .from(Projects::Table, Projects::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-projects-department_id")
                            .from(Projects::Table, Projects::DepartmentId)
                            .to(Departments::Table, Departments::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Create project_members table
        manager
            .create_table(
                Table::create()
                    .table(ProjectMembers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProjectMembers::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ProjectMembers::ProjectId).integer().not_null())
                    .col(ColumnDef::new(ProjectMembers::UserId).integer().not_null())
                    .col(ColumnDef::new(ProjectMembers::Role).string_len(20).not_null())
                    .col(
                        ColumnDef::new(ProjectMembers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-project_members-project_id")
                            .from(ProjectMembers::Table, ProjectMembers::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-project_members-user_id")
                            .from(ProjectMembers::Table, ProjectMembers::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq-project_members-project-user")
                    .table(ProjectMembers::Table)
                    .col(ProjectMembers::ProjectId)
                    .col(ProjectMembers::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Create project_notes table
        manager
            .create_table(
                Table::create()
                    .table(ProjectNotes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProjectNotes::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ProjectNotes::ProjectId).integer().not_null())
                    .col(ColumnDef::new(ProjectNotes::AuthorId).integer().not_null())
                    .col(ColumnDef::new(ProjectNotes::Content).text().not_null())
                    .col(
                        ColumnDef::new(ProjectNotes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-project_notes-project_id")
                            .from(ProjectNotes::Table, ProjectNotes::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-project_notes-author_id")
                            .from(ProjectNotes::Table, ProjectNotes::AuthorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create project_phases table
        manager
            .create_table(
                Table::create()
                    .table(ProjectPhases::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProjectPhases::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ProjectPhases::ProjectId).integer().not_null())
                    .col(ColumnDef::new(ProjectPhases::Name).string_len(200).not_null())
                    .col(
                        ColumnDef::new(ProjectPhases::SortOrder)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(ColumnDef::new(ProjectPhases::Status).string_len(20).not_null())
                    .col(ColumnDef::new(ProjectPhases::StartDate).timestamp_with_time_zone())
                    .col(ColumnDef::new(ProjectPhases::EndDate).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(ProjectPhases::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-project_phases-project_id")
                            .from(ProjectPhases::Table, ProjectPhases::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create phase_tasks table
        manager
            .create_table(
                Table::create()
                    .table(PhaseTasks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PhaseTasks::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PhaseTasks::ProjectId).integer().not_null())
                    .col(ColumnDef::new(PhaseTasks::PhaseId).integer().not_null())
                    .col(ColumnDef::new(PhaseTasks::Title).string_len(200).not_null())
                    .col(ColumnDef::new(PhaseTasks::Description).text())
                    .col(
                        ColumnDef::new(PhaseTasks::SortOrder)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(ColumnDef::new(PhaseTasks::Status).string_len(20).not_null())
                    .col(ColumnDef::new(PhaseTasks::AssigneeId).integer())
                    .col(ColumnDef::new(PhaseTasks::StartDate).timestamp_with_time_zone())
                    .col(ColumnDef::new(PhaseTasks::DueDate).timestamp_with_time_zone())
                    .col(ColumnDef::new(PhaseTasks::CompletedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(PhaseTasks::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PhaseTasks::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-phase_tasks-project_id")
                            .from(PhaseTasks::Table, PhaseTasks::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-phase_tasks-phase_id")
                            .from(PhaseTasks::Table, PhaseTasks::PhaseId)
                            .to(ProjectPhases::Table, ProjectPhases::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-phase_tasks-assignee_id")
                            .from(PhaseTasks::Table, PhaseTasks::AssigneeId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Create phase_details table
        manager
            .create_table(
                Table::create()
                    .table(PhaseDetails::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PhaseDetails::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PhaseDetails::PhaseId).integer().not_null())
                    .col(ColumnDef::new(PhaseDetails::ParentId).integer())
                    .col(ColumnDef::new(PhaseDetails::Title).string_len(200).not_null())
                    .col(ColumnDef::new(PhaseDetails::Description).text())
                    .col(
                        ColumnDef::new(PhaseDetails::IsCompleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(PhaseDetails::SortOrder)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(PhaseDetails::ItemType)
                            .string_len(20)
                            .not_null()
                            .default("task"),
                    )
                    .col(ColumnDef::new(PhaseDetails::Scope).string_len(100))
                    .col(ColumnDef::new(PhaseDetails::Reference).string_len(100))
                    .col(ColumnDef::new(PhaseDetails::Responsible).string_len(100))
                    .col(ColumnDef::new(PhaseDetails::Effort).double())
                    .col(
                        ColumnDef::new(PhaseDetails::Unit)
                            .string_len(20)
                            .not_null()
                            .default("Hours"),
                    )
                    .col(
                        ColumnDef::new(PhaseDetails::Priority)
                            .string_len(20)
                            .not_null()
                            .default("Normal"),
                    )
                    .col(ColumnDef::new(PhaseDetails::StartDate).timestamp_with_time_zone())
                    .col(ColumnDef::new(PhaseDetails::EndDate).timestamp_with_time_zone())
                    .col(ColumnDef::new(PhaseDetails::CompletedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(PhaseDetails::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PhaseDetails::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-phase_details-phase_id")
                            .from(PhaseDetails::Table, PhaseDetails::PhaseId)
                            .to(ProjectPhases::Table, ProjectPhases::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-phase_details-parent_id")
                            .from(PhaseDetails::Table, PhaseDetails::ParentId)
                            .to(PhaseDetails::Table, PhaseDetails::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create phase_detail_notes table
        manager
            .create_table(
                Table::create()
                    .table(PhaseDetailNotes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PhaseDetailNotes::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PhaseDetailNotes::DetailId).integer().not_null())
                    .col(ColumnDef::new(PhaseDetailNotes::User).string_len(100).not_null())
                    .col(ColumnDef::new(PhaseDetailNotes::Note).text().not_null())
                    .col(
                        ColumnDef::new(PhaseDetailNotes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-phase_detail_notes-detail_id")
                            .from(PhaseDetailNotes::Table, PhaseDetailNotes::DetailId)
                            .to(PhaseDetails::Table, PhaseDetails::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create project_files table
        manager
            .create_table(
                Table::create()
                    .table(ProjectFiles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProjectFiles::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ProjectFiles::ProjectId).integer().not_null())
                    .col(ColumnDef::new(ProjectFiles::UploaderId).integer())
                    .col(ColumnDef::new(ProjectFiles::Filename).string_len(255).not_null())
                    .col(
                        ColumnDef::new(ProjectFiles::StoredPath)
                            .string_len(500)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ProjectFiles::ContentType).string_len(100))
                    .col(ColumnDef::new(ProjectFiles::SizeBytes).big_integer())
                    .col(
                        ColumnDef::new(ProjectFiles::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-project_files-project_id")
                            .from(ProjectFiles::Table, ProjectFiles::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-project_files-uploader_id")
                            .from(ProjectFiles::Table, ProjectFiles::UploaderId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Create project_expenses table
        manager
            .create_table(
                Table::create()
                    .table(ProjectExpenses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProjectExpenses::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ProjectExpenses::ProjectId).integer().not_null())
                    .col(ColumnDef::new(ProjectExpenses::Amount).double().not_null())
                    .col(ColumnDef::new(ProjectExpenses::Note).string_len(255))
                    .col(ColumnDef::new(ProjectExpenses::CreatedBy).integer())
                    .col(
                        ColumnDef::new(ProjectExpenses::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-project_expenses-project_id")
                            .from(ProjectExpenses::Table, ProjectExpenses::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-project_expenses-created_by")
                            .from(ProjectExpenses::Table, ProjectExpenses::CreatedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Create indexes for the common lookups
        manager
            .create_index(
                Index::create()
                    .name("idx-projects-owner_id")
                    .table(Projects::Table)
                    .col(Projects::OwnerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-project_phases-project_id")
                    .table(ProjectPhases::Table)
                    .col(ProjectPhases::ProjectId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-phase_details-phase_id")
                    .table(PhaseDetails::Table)
                    .col(PhaseDetails::PhaseId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-phase_details-parent_id")
                    .table(PhaseDetails::Table)
                    .col(PhaseDetails::ParentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-phase_tasks-phase_id")
                    .table(PhaseTasks::Table)
                    .col(PhaseTasks::PhaseId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-phase_detail_notes-detail_id")
                    .table(PhaseDetailNotes::Table)
                    .col(PhaseDetailNotes::DetailId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ProjectExpenses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProjectFiles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PhaseDetailNotes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PhaseDetails::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PhaseTasks::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProjectPhases::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProjectNotes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProjectMembers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Projects::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Departments::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(Iden)]
enum Departments {
    Table,
    Id,
    Name,
    CreatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Name,
    Email,
    PasswordHash,
    Role,
    DepartmentId,
    CreatedAt,
}

#[derive(Iden)]
enum Projects {
    Table,
    Id,
    Title,
    Status,
    Priority,
    Progress,
    OwnerId,
    DepartmentId,
    StartDate,
    EndDate,
    CreatedAt,
    TotalBudget,
    SpentAmount,
}

#[derive(Iden)]
enum ProjectMembers {
    Table,
    Id,
    ProjectId,
    UserId,
    Role,
    CreatedAt,
}

#[derive(Iden)]
enum ProjectNotes {
    Table,
    Id,
    ProjectId,
    AuthorId,
    Content,
    CreatedAt,
}

#[derive(Iden)]
enum ProjectPhases {
    Table,
    Id,
    ProjectId,
    Name,
    SortOrder,
    Status,
    StartDate,
    EndDate,
    CreatedAt,
}

#[derive(Iden)]
enum PhaseTasks {
    Table,
    Id,
    ProjectId,
    PhaseId,
    Title,
    Description,
    SortOrder,
    Status,
    AssigneeId,
    StartDate,
    DueDate,
    CompletedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum PhaseDetails {
    Table,
    Id,
    PhaseId,
    ParentId,
    Title,
    Description,
    IsCompleted,
    SortOrder,
    ItemType,
    Scope,
    Reference,
    Responsible,
    Effort,
    Unit,
    Priority,
    StartDate,
    EndDate,
    CompletedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum PhaseDetailNotes {
    Table,
    Id,
    DetailId,
    User,
    Note,
    CreatedAt,
}

#[derive(Iden)]
enum ProjectFiles {
    Table,
    Id,
    ProjectId,
    UploaderId,
    Filename,
    StoredPath,
    ContentType,
    SizeBytes,
    CreatedAt,
}

#[derive(Iden)]
enum ProjectExpenses {
    Table,
    Id,
    ProjectId,
    Amount,
    Note,
    CreatedBy,
    CreatedAt,
}
