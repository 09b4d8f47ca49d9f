//! Suscripciones a cambios del almacén.
//!
//! Cada suscripción es una tarea que observa un canal `watch` del almacén y reenvía el
//! valor (transformado) por un `mpsc` propio. Soltar la `Subscription` cierra el `mpsc`,
//! la tarea lo detecta y termina, liberando su receptor `watch`.
//!
//! Si el almacén pasa a no disponible (`online = false`) la tarea también termina y el
//! suscriptor ve el fin del flujo.


use tokio::sync::{mpsc, watch};
use tokio_stream::wrappers::ReceiverStream;
use tracing::debug;
use crate::config::channels::SUBSCRIPTION;


#[derive(Debug)]
pub struct Subscription<T> {
    rx: mpsc::Receiver<T>,
}


impl<T> Subscription<T> {
    /// Próxima notificación; `None` cuando el almacén cerró la suscripción.
    pub async fn next(&mut self) -> Option<T> {
        self.rx.recv().await
    }

    pub fn into_stream(self) -> ReceiverStream<T> {
        ReceiverStream::new(self.rx)
    }

    /// Corta la entrega de notificaciones.
    pub fn unsubscribe(self) {}
}


/// Crea una suscripción sobre `source`, entregando primero el valor actual.
pub(crate) fn forward<S, T, F>(mut source: watch::Receiver<S>,
                               mut online: watch::Receiver<bool>,
                               map: F) -> Subscription<T>
where
    S: Send + Sync + 'static,
    T: Send + 'static,
    F: Fn(&S) -> T + Send + 'static,
{
    let (tx, rx) = mpsc::channel::<T>(SUBSCRIPTION);

    tokio::spawn(async move {
        let first = map(&*source.borrow_and_update());
        if tx.send(first).await.is_err() {
            return;
        }

        loop {
            tokio::select! {
                changed = source.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let value = map(&*source.borrow_and_update());
                    if tx.send(value).await.is_err() {
                        break;
                    }
                }
                changed = online.changed() => {
                    if changed.is_err() || !*online.borrow_and_update() {
                        debug!("Debug: almacén fuera de línea, cerrando suscripción");
                        break;
                    }
                }
                _ = tx.closed() => {
                    break;
                }
            }
        }
        debug!("Debug: suscripción finalizada");
    });

    Subscription { rx }
}
