//! Suscripciones del monitor al almacén.
//!
//! Cada canal (lecturas, umbrales) tiene su propia tarea con una máquina de estados:
//! `Init` abre la suscripción, `Work` reenvía cada notificación a la bandeja del monitor y
//! `Error` avisa al monitor que el canal se perdió y espera antes de volver a `Init`.


use std::pin::Pin;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tokio_stream::{Stream, StreamExt};
use tracing::{error, info, instrument, warn};
use crate::context::domain::AppContext;
use crate::monitor::domain::{Event, Feed};
use crate::store::domain::{Store, StoreError};


type EventStream = Pin<Box<dyn Stream<Item = Event> + Send>>;


#[derive(Debug, Clone, Copy, PartialEq)]
enum StateFeed {
    Init,
    Work,
    Error,
}


async fn open_feed(store: &dyn Store, feed: Feed) -> Result<EventStream, StoreError> {
    let stream: EventStream = match feed {
        Feed::Readings => Box::pin(store.subscribe_readings(None).await?.into_stream().map(Event::Readings)),
        Feed::Thresholds => Box::pin(store.subscribe_thresholds().await?.into_stream().map(Event::Thresholds)),
    };
    Ok(stream)
}


#[instrument(name = "run_feed_task", skip(tx_to_monitor, app_context))]
pub async fn feed_task(feed: Feed,
                       tx_to_monitor: mpsc::Sender<Event>,
                       app_context: AppContext) {

    info!("Info: feed task creada");

    let mut state = StateFeed::Init;
    let mut stream: Option<EventStream> = None;

    loop {
        match state {
            StateFeed::Init => {
                match open_feed(app_context.store.as_ref(), feed).await {
                    Ok(s) => {
                        info!("Info: suscripción abierta");
                        stream = Some(s);
                        state = StateFeed::Work;
                    }
                    Err(e) => {
                        error!("Error: no se pudo suscribir {e}");
                        state = StateFeed::Error;
                    }
                }
            }

            StateFeed::Work => {
                if let Some(s) = stream.as_mut() {
                    tokio::select! {
                        event = s.next() => {
                            match event {
                                Some(event) => {
                                    if tx_to_monitor.send(event).await.is_err() {
                                        info!("Info: monitor cerrado, terminando tarea");
                                        return;
                                    }
                                }
                                None => {
                                    warn!("Warning: suscripción cerrada por el almacén");
                                    state = StateFeed::Error;
                                }
                            }
                        }
                        _ = tx_to_monitor.closed() => {
                            info!("Info: monitor cerrado, terminando tarea");
                            return;
                        }
                    }
                } else {
                    warn!("Warning: estado Work sin suscripción, reiniciando...");
                    state = StateFeed::Init;
                }
            }

            StateFeed::Error => {
                stream = None;

                if tx_to_monitor.send(Event::FeedLost(feed)).await.is_err() {
                    info!("Info: monitor cerrado, terminando tarea");
                    return;
                }
                sleep(app_context.system.store_retry()).await;
                state = StateFeed::Init;
            }
        }
    }
}


pub fn start_feed(feed: Feed,
                  tx_to_monitor: mpsc::Sender<Event>,
                  app_context: AppContext) {

    info!("Info: iniciando tarea feed {feed:?}");
    tokio::spawn(async move {
        feed_task(feed,
                  tx_to_monitor,
                  app_context).await;
    });
}
