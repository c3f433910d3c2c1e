use crate::domain::dialog::{DialogAction, DialogMode};
use crate::domain::order_status::{OrderStatusTransition, StatusError, StatusId, TransitionTable};
use crate::domain::scan::{ScanOutcome, ScanSession};
use super::aggregate::OrderAggregate;
use super::commands::StatusChangeRequest;
use super::errors::{OrderError, ProcessingError};

// ============================================================================
// Order Processing Flow
// ============================================================================
//
// Decides, for a chosen target status, whether the change can be committed
// straight away or needs a barcode scan of every item first.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum ProcessingPlan {
    CommitDirectly(OrderStatusTransition),
    ScanFirst(OrderStatusTransition),
}

impl ProcessingPlan {
    pub fn edge(&self) -> &OrderStatusTransition {
        match self {
            ProcessingPlan::CommitDirectly(edge) | ProcessingPlan::ScanFirst(edge) => edge,
        }
    }

    pub fn requires_scan(&self) -> bool {
        matches!(self, ProcessingPlan::ScanFirst(_))
    }
}

pub fn plan_status_change(
    table: &TransitionTable,
    current: StatusId,
    target: StatusId,
) -> Result<ProcessingPlan, StatusError> {
    let edge = table
        .find(current, target)
        .ok_or(StatusError::TransitionNotAllowed { from: current, to: target })?;

    if edge.scanning_required {
        Ok(ProcessingPlan::ScanFirst(edge.clone()))
    } else {
        Ok(ProcessingPlan::CommitDirectly(edge.clone()))
    }
}

// ============================================================================
// Order Processing Dialog
// ============================================================================

/// State behind the "process order" dialog: the offered transitions, the
/// chosen plan and, when required, a scan session for this order only.
#[derive(Debug, Clone)]
pub struct OrderProcessingDialog {
    order: OrderAggregate,
    mode: DialogMode,
    plan: Option<ProcessingPlan>,
    scan: Option<ScanSession>,
}

impl OrderProcessingDialog {
    pub fn open(order: OrderAggregate) -> Result<Self, ProcessingError> {
        Ok(Self {
            order,
            mode: DialogMode::Closed.apply(DialogAction::Open)?,
            plan: None,
            scan: None,
        })
    }

    pub fn mode(&self) -> DialogMode {
        self.mode
    }

    pub fn plan(&self) -> Option<&ProcessingPlan> {
        self.plan.as_ref()
    }

    pub fn scan(&self) -> Option<&ScanSession> {
        self.scan.as_ref()
    }

    /// One button per out-edge of the order's current status
    pub fn offered<'t>(&self, table: &'t TransitionTable) -> Vec<&'t OrderStatusTransition> {
        table.out_edges(self.order.status_id)
    }

    /// Picks a target status; a scan step starts from zero every time
    pub fn choose(&mut self, table: &TransitionTable, target: StatusId) -> Result<&ProcessingPlan, ProcessingError> {
        let plan = plan_status_change(table, self.order.status_id, target)?;

        if !self.mode.is_editing() {
            self.mode = self.mode.apply(DialogAction::Edit)?;
        }

        self.scan = plan.requires_scan().then(|| self.order.scan_session());
        Ok(self.plan.insert(plan))
    }

    /// None when the chosen plan has no scan step
    pub fn record_scan(&mut self, raw: &str) -> Option<ScanOutcome> {
        self.scan.as_mut().map(|session| session.record_scan(raw))
    }

    /// Whether the submit button is enabled
    pub fn can_submit(&self) -> bool {
        match (&self.plan, &self.scan) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(_), Some(session)) => session.can_submit(),
        }
    }

    /// Builds the request sent to the backend; nothing is sent when this fails
    pub fn submit(&self, explanation: Option<String>) -> Result<StatusChangeRequest, ProcessingError> {
        let plan = self.plan.as_ref().ok_or(ProcessingError::NoTargetSelected)?;
        let mut request = StatusChangeRequest::to(plan.edge().to);
        request.explanation = explanation;

        if plan.requires_scan() {
            let session = self.scan.as_ref().ok_or(OrderError::ScanRequired)?;
            let confirmation = session.confirm().map_err(OrderError::from)?;
            request = request.with_scan(confirmation);
        }

        Ok(request)
    }

    /// Backend accepted the change
    pub fn saved(&mut self, updated: OrderAggregate) -> Result<(), ProcessingError> {
        self.mode = self.mode.apply(DialogAction::Saved)?;
        self.order = updated;
        self.plan = None;
        self.scan = None;
        Ok(())
    }

    pub fn cancel(&mut self) -> Result<(), ProcessingError> {
        self.mode = self.mode.apply(DialogAction::Cancel)?;
        self.plan = None;
        self.scan = None;
        Ok(())
    }

    pub fn close(&mut self) {
        self.mode = DialogMode::Closed;
        self.plan = None;
        self.scan = None;
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
