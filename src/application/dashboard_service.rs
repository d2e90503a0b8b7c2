// Dashboard service - widget refresh protocol and user interaction
use crate::application::actions::{ActionDispatcher, ActionPhase};
use crate::application::charts::ChartRegistry;
use crate::application::cloud_api::{ApiError, CloudApi};
use crate::application::counters::{CounterAnimator, KpiBoard};
use crate::application::filter::FilterBar;
use crate::application::modal::{ClickTarget, Modal};
use crate::application::widgets::{fetch_payload, DetailBindings, SummaryView, WidgetPayload};
use crate::domain::dashboard::{kpi, Notification, WidgetKind};
use crate::domain::resources::{ActionRequest, ActionResponse, Granularity, InstanceAction};
use crate::infrastructure::config::DashboardSettings;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

/// Completions delivered back to the event loop by spawned tasks
#[derive(Debug)]
pub enum DashboardEvent {
    Loaded {
        generation: u64,
        payload: WidgetPayload,
    },
    ActionCompleted {
        request: ActionRequest,
        outcome: Result<ActionResponse, ApiError>,
    },
    ActionRefreshDue,
}

/// User intents, already mapped from keys and clicks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    SelectGranularity(Granularity),
    ViewDetails(WidgetKind),
    CloseModal,
    Click(ClickTarget),
    SelectNext,
    SelectPrevious,
    RequestAction(InstanceAction),
    Confirm(bool),
    DismissNotification,
    ReloadAll,
}

/// Which layer currently receives input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Modal,
    Confirm,
    Notification,
}

/// Application context: owns every piece of dashboard state.
///
/// All mutation happens on the task driving `execute`, `handle_event` and
/// `tick`; network calls run on spawned tasks and report back via the channel
/// returned from `new`.
pub struct DashboardService {
    api: Arc<dyn CloudApi>,
    settings: DashboardSettings,
    events: mpsc::UnboundedSender<DashboardEvent>,
    charts: ChartRegistry,
    counters: CounterAnimator,
    kpis: KpiBoard,
    modal: Modal,
    filter: FilterBar,
    bindings: DetailBindings,
    actions: ActionDispatcher,
    notification: Option<Notification>,
    generations: HashMap<WidgetKind, u64>,
}

impl DashboardService {
    pub fn new(
        api: Arc<dyn CloudApi>,
        settings: DashboardSettings,
    ) -> (Self, mpsc::UnboundedReceiver<DashboardEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let filter = FilterBar::new(settings.default_granularity);

        let service = Self {
            api,
            settings,
            events: tx,
            charts: ChartRegistry::new(),
            counters: CounterAnimator::new(),
            kpis: KpiBoard::with_elements(kpi::ALL),
            modal: Modal::new(),
            filter,
            bindings: DetailBindings::default(),
            actions: ActionDispatcher::new(),
            notification: None,
            generations: HashMap::new(),
        };
        (service, rx)
    }

    pub fn load_all(&mut self) {
        for kind in WidgetKind::ALL {
            self.refresh(kind);
        }
    }

    /// Start a fetch for `kind`. Any fetch for the same widget still in flight
    /// is superseded: its result will be dropped on arrival.
    pub fn refresh(&mut self, kind: WidgetKind) {
        let generation = {
            let counter = self.generations.entry(kind).or_insert(0);
            *counter += 1;
            *counter
        };

        let api = self.api.clone();
        let tx = self.events.clone();
        let granularity = self.filter.active();

        tokio::spawn(async move {
            match fetch_payload(api.as_ref(), kind, granularity).await {
                Ok(payload) => {
                    let _ = tx.send(DashboardEvent::Loaded {
                        generation,
                        payload,
                    });
                }
                Err(e) => {
                    tracing::error!("Error loading {}: {}", kind.endpoint(), e);
                }
            }
        });
    }

    pub fn handle_event(&mut self, event: DashboardEvent) {
        match event {
            DashboardEvent::Loaded {
                generation,
                payload,
            } => {
                let kind = payload.kind();
                if self.generations.get(&kind).copied() != Some(generation) {
                    tracing::debug!("Dropping superseded {} result (generation {})", kind, generation);
                    return;
                }
                self.apply(payload);
            }
            DashboardEvent::ActionCompleted { request, outcome } => {
                match &outcome {
                    Ok(response) => tracing::info!(
                        "{} on {} answered success={}",
                        request.action,
                        request.instance_id,
                        response.success
                    ),
                    Err(e) => tracing::error!(
                        "{} on {} failed: {}",
                        request.action,
                        request.instance_id,
                        e
                    ),
                }
                self.notification = Some(self.actions.complete(&outcome));
                self.schedule_action_refresh();
            }
            DashboardEvent::ActionRefreshDue => {
                self.modal.close();
                self.actions.reset_controls();
                self.refresh(WidgetKind::Compute);
            }
        }
    }

    pub fn execute(&mut self, command: Command) {
        match command {
            Command::SelectGranularity(granularity) => {
                self.filter.select(granularity);
                self.refresh(WidgetKind::Cost);
            }
            Command::ViewDetails(kind) => self.view_details(kind),
            Command::CloseModal => self.modal.close(),
            Command::Click(target) => self.modal.on_click(target),
            Command::SelectNext => self.modal.select_next(),
            Command::SelectPrevious => self.modal.select_previous(),
            Command::RequestAction(action) => self.request_action(action),
            Command::Confirm(accepted) => self.confirm_action(accepted),
            Command::DismissNotification => self.notification = None,
            Command::ReloadAll => self.load_all(),
        }
    }

    /// Advance KPI animations by one frame; true while any are running
    pub fn tick(&mut self, now: Instant) -> bool {
        self.counters.tick(&mut self.kpis, now)
    }

    pub fn input_mode(&self) -> InputMode {
        if self.notification.is_some() {
            InputMode::Notification
        } else if matches!(self.actions.phase(), ActionPhase::Confirming(_)) {
            InputMode::Confirm
        } else if self.modal.is_open() {
            InputMode::Modal
        } else {
            InputMode::Normal
        }
    }

    pub fn kpis(&self) -> &KpiBoard {
        &self.kpis
    }

    pub fn charts(&self) -> &ChartRegistry {
        &self.charts
    }

    pub fn modal(&self) -> &Modal {
        &self.modal
    }

    pub fn filter(&self) -> &FilterBar {
        &self.filter
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    pub fn confirmation_prompt(&self) -> Option<String> {
        self.actions.prompt()
    }

    /// KPI counters, chart, then the detail binding
    fn apply(&mut self, payload: WidgetPayload) {
        let kind = payload.kind();
        tracing::debug!("Rendering {}", kind);

        for (id, end) in payload.kpis() {
            let start = self.kpis.get(id).unwrap_or(0);
            self.counters
                .animate(&mut self.kpis, id, start, end, self.settings.counter_duration());
        }

        let config = payload.chart();
        match kind {
            WidgetKind::Cost => self.charts.render_series(kind, config),
            _ => self.charts.render(kind, config),
        };

        if kind == WidgetKind::Compute {
            self.actions.reset_controls();
        }

        self.bindings.bind(Arc::new(payload));
    }

    fn view_details(&mut self, kind: WidgetKind) {
        match self.bindings.latest(kind) {
            Some(snapshot) => {
                let (title, mut table) = snapshot.detail_view();
                // rows are rebuilt from the snapshot; carry submitted controls over
                let pending: Vec<ActionRequest> = table
                    .rows
                    .iter()
                    .flat_map(|row| row.actions.iter())
                    .map(|control| control.request.clone())
                    .filter(|request| self.actions.is_pending(request))
                    .collect();
                for request in &pending {
                    table.mark_pending(request);
                }
                self.modal.open(title, table);
            }
            None => tracing::debug!("No {} data loaded yet", kind),
        }
    }

    fn request_action(&mut self, action: InstanceAction) {
        let Some(control) = self.modal.selected_row().and_then(|row| row.action(action)) else {
            return;
        };
        if !control.is_available() {
            return;
        }
        let request = control.request.clone();
        self.actions.request(request);
    }

    fn confirm_action(&mut self, accepted: bool) {
        let Some(request) = self.actions.confirm(accepted) else {
            return;
        };

        if let Some(table) = self.modal.body_mut() {
            table.mark_pending(&request);
        }

        let api = self.api.clone();
        let tx = self.events.clone();
        tokio::spawn(async move {
            let outcome = api.ec2_action(&request).await;
            let _ = tx.send(DashboardEvent::ActionCompleted { request, outcome });
        });
    }

    fn schedule_action_refresh(&self) {
        let tx = self.events.clone();
        let delay = self.settings.action_refresh_delay();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(DashboardEvent::ActionRefreshDue);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::charts::ChartKind;
    use crate::domain::dashboard::NotificationKind;
    use crate::domain::resources::{
        CostDataset, CostSeries, Ec2Summary, IamSummary, S3Summary,
    };
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    struct FakeCloudApi {
        calls: Mutex<Vec<String>>,
        ec2: Ec2Summary,
        action_outcome: fn() -> Result<ActionResponse, ApiError>,
    }

    impl FakeCloudApi {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                ec2: serde_json::from_value(serde_json::json!({
                    "total": 2, "running": 1, "stopped": 1,
                    "instances": [
                        {"Name": "a", "InstanceId": "i-1", "InstanceType": "t2.micro", "State": "running", "CPU_Avg_24h": 10},
                        {"Name": "b", "InstanceId": "i-2", "InstanceType": "t2.micro", "State": "stopped", "CPU_Avg_24h": 0}
                    ]
                }))
                .unwrap(),
                action_outcome: || Ok(ActionResponse::succeeded("Successfully initiated stop for i-1")),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }
    }

    fn series(granularity: Granularity, value: f64) -> CostSeries {
        CostSeries {
            labels: vec!["p1".into()],
            datasets: vec![CostDataset {
                label: format!("{} AWS Cost ($)", granularity.label()),
                data: vec![value],
                border_color: None,
                background_color: None,
                fill: None,
                tension: None,
            }],
            anomalies: vec![],
        }
    }

    #[async_trait]
    impl CloudApi for FakeCloudApi {
        async fn cost_data(&self, granularity: Granularity) -> Result<CostSeries, ApiError> {
            self.record(format!("cost-data {}", granularity));
            // daily answers slowly so a later filter click overtakes it
            let delay = match granularity {
                Granularity::Daily => 500,
                _ => 10,
            };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            let value = match granularity {
                Granularity::Daily => 1.0,
                Granularity::Weekly => 7.0,
                Granularity::Monthly => 30.0,
                Granularity::Yearly => 365.0,
            };
            Ok(series(granularity, value))
        }

        async fn ec2_summary(&self) -> Result<Ec2Summary, ApiError> {
            self.record("ec2-summary".into());
            Ok(self.ec2.clone())
        }

        async fn s3_summary(&self) -> Result<S3Summary, ApiError> {
            self.record("s3-summary".into());
            Err(ApiError::Status {
                endpoint: "s3-summary".into(),
                status: 500,
                body: "boom".into(),
            })
        }

        async fn iam_summary(&self) -> Result<IamSummary, ApiError> {
            self.record("iam-summary".into());
            Ok(IamSummary {
                total: 0,
                mfa_enabled: 0,
                no_mfa: 0,
                users: vec![],
            })
        }

        async fn ec2_action(&self, request: &ActionRequest) -> Result<ActionResponse, ApiError> {
            self.record(format!("ec2-action {} {}", request.action, request.instance_id));
            (self.action_outcome)()
        }
    }

    fn build_service(api: Arc<FakeCloudApi>) -> (DashboardService, mpsc::UnboundedReceiver<DashboardEvent>) {
        DashboardService::new(api, DashboardSettings::default())
    }

    async fn load_compute(
        service: &mut DashboardService,
        rx: &mut mpsc::UnboundedReceiver<DashboardEvent>,
    ) {
        service.refresh(WidgetKind::Compute);
        let event = rx.recv().await.unwrap();
        service.handle_event(event);
    }

    #[tokio::test(start_paused = true)]
    async fn test_compute_widget_end_to_end() {
        let api = Arc::new(FakeCloudApi::new());
        let (mut service, mut rx) = build_service(api.clone());

        load_compute(&mut service, &mut rx).await;

        let t0 = Instant::now();
        service.tick(t0);
        assert!(!service.tick(t0 + Duration::from_secs(2)));
        assert_eq!(service.kpis().get(kpi::EC2_TOTAL), Some(2));
        assert_eq!(service.kpis().get(kpi::EC2_RUNNING), Some(1));
        assert_eq!(service.kpis().get(kpi::EC2_STOPPED), Some(1));

        let chart = service.charts().get(WidgetKind::Compute).unwrap();
        assert_eq!(chart.config.kind, ChartKind::Doughnut);

        service.execute(Command::ViewDetails(WidgetKind::Compute));
        assert_eq!(service.input_mode(), InputMode::Modal);
        let table = service.modal().body().unwrap();
        assert_eq!(service.modal().title(), "All EC2 Instances");
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].cells[3], "10%");
        assert_eq!(table.rows[1].cells[3], "N/A");
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_replaces_categorical_chart() {
        let api = Arc::new(FakeCloudApi::new());
        let (mut service, mut rx) = build_service(api);

        load_compute(&mut service, &mut rx).await;
        let first = service.charts().get(WidgetKind::Compute).unwrap().handle;
        load_compute(&mut service, &mut rx).await;

        assert_ne!(service.charts().get(WidgetKind::Compute).unwrap().handle, first);
        assert_eq!(service.charts().live_count(), 1);
        assert_eq!(service.charts().destroyed_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_fetch_renders_nothing() {
        let api = Arc::new(FakeCloudApi::new());
        let (mut service, mut rx) = build_service(api.clone());

        service.refresh(WidgetKind::Storage);
        let waited = tokio::time::timeout(Duration::from_secs(1), rx.recv()).await;

        assert!(waited.is_err());
        assert_eq!(api.calls(), vec!["s3-summary"]);
        assert!(service.charts().get(WidgetKind::Storage).is_none());

        service.execute(Command::ViewDetails(WidgetKind::Storage));
        assert!(!service.modal().is_open());
    }

    #[tokio::test(start_paused = true)]
    async fn test_latest_granularity_wins() {
        let api = Arc::new(FakeCloudApi::new());
        let (mut service, mut rx) = build_service(api.clone());

        service.refresh(WidgetKind::Cost);
        service.execute(Command::SelectGranularity(Granularity::Monthly));

        for _ in 0..2 {
            let event = rx.recv().await.unwrap();
            service.handle_event(event);
        }

        assert!(service.filter().is_active(Granularity::Monthly));
        let chart = service.charts().get(WidgetKind::Cost).unwrap();
        assert_eq!(chart.config.kind, ChartKind::Line);
        assert_eq!(chart.config.data.datasets[0].values, vec![30.0]);
        assert_eq!(chart.config.data.datasets[0].label, "Monthly AWS Cost ($)");
        assert_eq!(api.calls(), vec!["cost-data DAILY", "cost-data MONTHLY"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cost_chart_updates_in_place_across_filters() {
        let api = Arc::new(FakeCloudApi::new());
        let (mut service, mut rx) = build_service(api);

        service.execute(Command::SelectGranularity(Granularity::Weekly));
        service.handle_event(rx.recv().await.unwrap());
        let handle = service.charts().get(WidgetKind::Cost).unwrap().handle;

        service.execute(Command::SelectGranularity(Granularity::Yearly));
        service.handle_event(rx.recv().await.unwrap());

        let chart = service.charts().get(WidgetKind::Cost).unwrap();
        assert_eq!(chart.handle, handle);
        assert_eq!(chart.revision, 1);
        assert_eq!(service.charts().destroyed_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_action_flow_refreshes_after_delay() {
        let api = Arc::new(FakeCloudApi::new());
        let (mut service, mut rx) = build_service(api.clone());
        load_compute(&mut service, &mut rx).await;
        service.execute(Command::ViewDetails(WidgetKind::Compute));

        service.execute(Command::RequestAction(InstanceAction::Stop));
        assert_eq!(service.input_mode(), InputMode::Confirm);
        assert_eq!(
            service.confirmation_prompt().as_deref(),
            Some("Are you sure you want to stop instance i-1?")
        );

        service.execute(Command::Confirm(true));
        let control = service.modal().body().unwrap().rows[0]
            .action(InstanceAction::Stop)
            .unwrap()
            .clone();
        assert!(control.pending);
        assert!(!control.enabled);
        assert_eq!(control.label(), "Working...");

        service.handle_event(rx.recv().await.unwrap());
        let notification = service.notification().unwrap();
        assert_eq!(notification.kind, NotificationKind::Info);
        assert_eq!(service.input_mode(), InputMode::Notification);
        service.execute(Command::DismissNotification);

        let before = tokio::time::Instant::now();
        let due = rx.recv().await.unwrap();
        assert!(matches!(due, DashboardEvent::ActionRefreshDue));
        assert!(before.elapsed() >= Duration::from_millis(3000));
        service.handle_event(due);
        assert!(!service.modal().is_open());

        service.handle_event(rx.recv().await.unwrap());
        assert_eq!(
            api.calls(),
            vec!["ec2-summary", "ec2-action stop i-1", "ec2-summary"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_control_survives_modal_reopen() {
        let api = Arc::new(FakeCloudApi::new());
        let (mut service, mut rx) = build_service(api.clone());
        load_compute(&mut service, &mut rx).await;
        service.execute(Command::ViewDetails(WidgetKind::Compute));
        service.execute(Command::RequestAction(InstanceAction::Stop));
        service.execute(Command::Confirm(true));

        service.execute(Command::CloseModal);
        service.execute(Command::ViewDetails(WidgetKind::Compute));

        let stop = |service: &DashboardService| {
            service.modal().body().unwrap().rows[0]
                .action(InstanceAction::Stop)
                .unwrap()
                .clone()
        };
        let control = stop(&service);
        assert!(control.pending);
        assert!(!control.enabled);
        assert_eq!(control.label(), "Working...");
        assert!(service.modal().body().unwrap().rows[1]
            .action(InstanceAction::Start)
            .unwrap()
            .is_available());

        // the delayed refresh frees the controls even before new data arrives
        service.handle_event(rx.recv().await.unwrap());
        service.execute(Command::DismissNotification);
        let due = rx.recv().await.unwrap();
        assert!(matches!(due, DashboardEvent::ActionRefreshDue));
        service.handle_event(due);
        service.execute(Command::ViewDetails(WidgetKind::Compute));
        assert!(stop(&service).is_available());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_action_still_refreshes() {
        let mut fake = FakeCloudApi::new();
        fake.action_outcome = || {
            Err(ApiError::Status {
                endpoint: "ec2-action".into(),
                status: 503,
                body: "unavailable".into(),
            })
        };
        let api = Arc::new(fake);
        let (mut service, mut rx) = build_service(api.clone());
        load_compute(&mut service, &mut rx).await;
        service.execute(Command::ViewDetails(WidgetKind::Compute));

        service.execute(Command::RequestAction(InstanceAction::Stop));
        service.execute(Command::Confirm(true));
        service.handle_event(rx.recv().await.unwrap());

        let notification = service.notification().unwrap();
        assert_eq!(notification.kind, NotificationKind::Error);
        assert!(notification.message.starts_with("Failed to perform action:"));

        let due = rx.recv().await.unwrap();
        assert!(matches!(due, DashboardEvent::ActionRefreshDue));
        service.handle_event(due);
        assert!(!service.modal().is_open());
    }

    #[tokio::test(start_paused = true)]
    async fn test_declined_action_sends_nothing() {
        let api = Arc::new(FakeCloudApi::new());
        let (mut service, mut rx) = build_service(api.clone());
        load_compute(&mut service, &mut rx).await;
        service.execute(Command::ViewDetails(WidgetKind::Compute));

        service.execute(Command::RequestAction(InstanceAction::Stop));
        service.execute(Command::Confirm(false));

        assert_eq!(service.input_mode(), InputMode::Modal);
        assert!(service.modal().body().unwrap().rows[0]
            .action(InstanceAction::Stop)
            .unwrap()
            .is_available());
        let waited = tokio::time::timeout(Duration::from_secs(5), rx.recv()).await;
        assert!(waited.is_err());
        assert_eq!(api.calls(), vec!["ec2-summary"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_control_cannot_be_requested() {
        let api = Arc::new(FakeCloudApi::new());
        let (mut service, mut rx) = build_service(api);
        load_compute(&mut service, &mut rx).await;
        service.execute(Command::ViewDetails(WidgetKind::Compute));

        // i-1 is running, so Start is disabled
        service.execute(Command::RequestAction(InstanceAction::Start));
        assert_eq!(service.input_mode(), InputMode::Modal);

        service.execute(Command::SelectNext);
        service.execute(Command::RequestAction(InstanceAction::Start));
        assert_eq!(
            service.confirmation_prompt().as_deref(),
            Some("Are you sure you want to start instance i-2?")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_view_details_uses_latest_snapshot() {
        let api = Arc::new(FakeCloudApi::new());
        let (mut service, mut rx) = build_service(api);

        service.refresh(WidgetKind::Identity);
        service.handle_event(rx.recv().await.unwrap());
        service.execute(Command::ViewDetails(WidgetKind::Identity));
        assert_eq!(service.modal().title(), "IAM User Details");
        assert!(service.modal().body().unwrap().rows.is_empty());

        service.execute(Command::Click(ClickTarget::Backdrop));
        assert!(!service.modal().is_open());
    }
}
