use tokio::sync::mpsc;
use tokio::time::{sleep, Duration};


pub enum TimerEvent {
    /// El temporizador expiró.
    Timeout,
    /// Comando interno para iniciar el temporizador.
    InitTimer(Duration),
}


pub async fn timer_task(tx_to_owner: mpsc::Sender<TimerEvent>,
                        mut cmd_rx: mpsc::Receiver<TimerEvent>) {
    loop {
        let duration = match cmd_rx.recv().await {
            Some(TimerEvent::InitTimer(d)) => d,
            None => break,
            _ => continue,
        };

        sleep(duration).await;
        if tx_to_owner.send(TimerEvent::Timeout).await.is_err() {
            break;
        }
    }
}


pub fn start_timer(tx_to_owner: mpsc::Sender<TimerEvent>,
                   rx_from_owner: mpsc::Receiver<TimerEvent>) {

    tokio::spawn(async move {
        timer_task(
            tx_to_owner,
            rx_from_owner
        ).await;
    });
}
