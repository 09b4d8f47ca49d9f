use fan_monitor_service::channels::domain::Channels;
use fan_monitor_service::context::domain::AppContext;
use fan_monitor_service::feed::logic::start_feed;
use fan_monitor_service::monitor::domain::Feed;
use fan_monitor_service::monitor::handle::MonitorHandle;
use fan_monitor_service::monitor::logic::start_monitor;
use fan_monitor_service::presenter::logic::start_presenter;
use fan_monitor_service::recorder::logic::start_recorder;
use fan_monitor_service::settings::logic::load_or_initialize;
use fan_monitor_service::simulator::logic::start_simulator;
use fan_monitor_service::system::domain::{init_tracing, System};
use fan_monitor_service::timer::domain::start_timer;
use tracing::{error, info};


#[tokio::main]
async fn main() {

    let system = match System::new() {
        Ok(system) => system,
        Err(e) => {
            eprintln!("Error: configuración inválida: {e}");
            return;
        }
    };

    init_tracing(&system);

    let channels = Channels::new();
    let app_context = AppContext::new(system).await;

    if let Err(e) = load_or_initialize(app_context.store.as_ref()).await {
        error!("Error: no se pudieron inicializar los umbrales {e}");
    }

    let handle = MonitorHandle::new(app_context.store.clone(),
                                    channels.presenter_from_monitor);

    start_monitor(channels.monitor_from_feed,
                  channels.monitor_to_presenter,
                  channels.monitor_to_recorder);

    start_feed(Feed::Readings,
               channels.feed_to_monitor.clone(),
               app_context.clone());

    start_feed(Feed::Thresholds,
               channels.feed_to_monitor,
               app_context.clone());

    start_recorder(channels.recorder_from_monitor,
                   app_context.clone());

    if app_context.system.simulator_enabled {
        start_timer(channels.timer_to_simulator,
                    channels.timer_from_simulator);

        start_simulator(channels.simulator_to_timer,
                        channels.simulator_from_timer,
                        app_context.clone());
    }

    start_presenter(handle, app_context.clone());

    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Info: señal de apagado recibida"),
        Err(e) => error!("Error: no se pudo escuchar la señal de apagado {e}"),
    }
}
