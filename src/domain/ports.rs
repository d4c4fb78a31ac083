use crate::domain::model::{
    CalendarEvent, CalendarEventSpec, Notification, RecordFields, RecordPatch,
};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 外部紀錄資料庫
#[async_trait]
pub trait RecordService: Send + Sync {
    /// 建立紀錄並回傳其 id
    async fn create_record(&self, fields: &RecordFields) -> Result<String>;
    async fn update_record(&self, record_id: &str, patch: &RecordPatch) -> Result<()>;
}

#[async_trait]
pub trait CalendarService: Send + Sync {
    async fn create_event(&self, spec: &CalendarEventSpec) -> Result<CalendarEvent>;
}

/// 通知 email，呼叫端不在乎結果
#[async_trait]
pub trait NotificationService: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<()>;
}
