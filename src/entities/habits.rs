use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "habits")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub title: String,
    pub description: String,
    /// One of `daily`, `weekly`, `monthly`; decoded strictly by the repository.
    pub frequency: String,
    pub category: String,
    pub time_of_day: Option<String>,
    pub reminder_time: Option<String>,
    pub streak: i32,
    pub completed: bool,
    pub last_completed: Option<String>,
    pub is_archived: bool,
    pub version: i32,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Users,
    #[sea_orm(has_many = "super::habit_logs::Entity")]
    HabitLogs,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::habit_logs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::HabitLogs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
