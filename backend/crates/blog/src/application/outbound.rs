//! Outbound collaborators for the blog routes

use std::sync::Arc;

use platform::mail::{DisabledMailer, Mailer};

use crate::domain::generator::{ContentGenerator, DisabledGenerator};

#[derive(Clone)]
pub struct BlogOutbound {
    pub mailer: Arc<dyn Mailer>,
    pub generator: Arc<dyn ContentGenerator>,
}

impl BlogOutbound {
    pub fn new(mailer: Arc<dyn Mailer>, generator: Arc<dyn ContentGenerator>) -> Self {
        Self { mailer, generator }
    }

    /// No mail, no generation
    pub fn disabled() -> Self {
        Self {
            mailer: Arc::new(DisabledMailer),
            generator: Arc::new(DisabledGenerator),
        }
    }
}
