//! Microphone permission lifecycle
//!
//! Tracks one capture request at a time and queues a notice for the front end
//! when the browser answers.

/// Where the microphone capability stands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MicState {
    /// Never requested
    #[default]
    Off,
    /// Waiting on the permission prompt
    Pending,
    /// Capture running
    Live,
    /// Last request was refused or failed
    Denied,
}

/// Outcome of a request, reported once
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MicNotice {
    Enabled,
    Denied,
}

impl MicNotice {
    pub fn message(&self) -> &'static str {
        match self {
            MicNotice::Enabled => "Microphone enabled! Speak to reveal enemies",
            MicNotice::Denied => "Microphone access denied. Please allow microphone access.",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MicStatus {
    state: MicState,
    notice: Option<MicNotice>,
}

impl MicStatus {
    pub fn state(&self) -> MicState {
        self.state
    }

    /// Claim the request slot. Refused while a request is pending or a capture
    /// is already live; allowed again after a denial.
    pub fn begin_request(&mut self) -> bool {
        match self.state {
            MicState::Pending | MicState::Live => false,
            MicState::Off | MicState::Denied => {
                self.state = MicState::Pending;
                true
            }
        }
    }

    /// Record the browser's answer to the pending request
    pub fn resolve(&mut self, granted: bool) {
        if self.state != MicState::Pending {
            return;
        }
        let (state, notice) = if granted {
            (MicState::Live, MicNotice::Enabled)
        } else {
            (MicState::Denied, MicNotice::Denied)
        };
        self.state = state;
        self.notice = Some(notice);
    }

    /// Take the pending notice, if any
    pub fn take_notice(&mut self) -> Option<MicNotice> {
        self.notice.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_request_refused_while_pending() {
        let mut status = MicStatus::default();
        assert!(status.begin_request());
        assert!(!status.begin_request());
        assert_eq!(status.state(), MicState::Pending);
        assert_eq!(status.take_notice(), None);
    }

    #[test]
    fn test_grant_reports_once_and_blocks_new_requests() {
        let mut status = MicStatus::default();
        status.begin_request();
        status.resolve(true);

        assert_eq!(status.state(), MicState::Live);
        assert_eq!(status.take_notice(), Some(MicNotice::Enabled));
        assert_eq!(status.take_notice(), None);
        assert!(!status.begin_request());
    }

    #[test]
    fn test_denial_allows_retry() {
        let mut status = MicStatus::default();
        status.begin_request();
        status.resolve(false);

        assert_eq!(status.state(), MicState::Denied);
        assert_eq!(status.take_notice(), Some(MicNotice::Denied));
        assert!(status.begin_request());
        assert_eq!(status.state(), MicState::Pending);
    }

    #[test]
    fn test_stray_answer_ignored() {
        let mut status = MicStatus::default();
        status.resolve(true);
        assert_eq!(status.state(), MicState::Off);
        assert_eq!(status.take_notice(), None);
    }
}
