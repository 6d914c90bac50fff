//! GetCallHandler - Looks up a call at the provider.

use std::sync::Arc;

use crate::domain::foundation::CallId;
use crate::ports::{CallControl, CallControlError, CallRecord};

use super::errors::CallError;

#[derive(Debug, Clone)]
pub struct GetCallQuery {
    pub call_id: String,
}

pub struct GetCallHandler {
    call_control: Arc<dyn CallControl>,
}

impl GetCallHandler {
    pub fn new(call_control: Arc<dyn CallControl>) -> Self {
        Self { call_control }
    }

    pub async fn handle(&self, query: GetCallQuery) -> Result<CallRecord, CallError> {
        let call_id = CallId::new(query.call_id)?;
        match self.call_control.get_call(call_id.as_str()).await {
            Ok(record) => Ok(record),
            Err(CallControlError::NotFound(_)) => Err(CallError::NotFound(call_id)),
            Err(e) => Err(e.into()),
        }
    }
}
