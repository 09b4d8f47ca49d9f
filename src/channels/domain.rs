use tokio::sync::{mpsc, watch};
use crate::alert::domain::NewAlert;
use crate::config::channels::{MONITOR_INBOX, RECORDER, TIMER};
use crate::monitor::domain::{DashboardSnapshot, Event};
use crate::timer::domain::TimerEvent;


pub struct Channels {
    pub feed_to_monitor: mpsc::Sender<Event>,
    pub monitor_from_feed: mpsc::Receiver<Event>,

    pub monitor_to_recorder: mpsc::Sender<NewAlert>,
    pub recorder_from_monitor: mpsc::Receiver<NewAlert>,

    pub monitor_to_presenter: watch::Sender<DashboardSnapshot>,
    pub presenter_from_monitor: watch::Receiver<DashboardSnapshot>,

    pub simulator_to_timer: mpsc::Sender<TimerEvent>,
    pub timer_from_simulator: mpsc::Receiver<TimerEvent>,

    pub timer_to_simulator: mpsc::Sender<TimerEvent>,
    pub simulator_from_timer: mpsc::Receiver<TimerEvent>,
}


impl Channels {
    pub fn new() -> Channels {
        let (f_to_m, m_from_f) = mpsc::channel::<Event>(MONITOR_INBOX);
        let (m_to_r, r_from_m) = mpsc::channel::<NewAlert>(RECORDER);
        let (m_to_p, p_from_m) = watch::channel(DashboardSnapshot::default());
        let (s_to_t, t_from_s) = mpsc::channel::<TimerEvent>(TIMER);
        let (t_to_s, s_from_t) = mpsc::channel::<TimerEvent>(TIMER);

        Self {
            feed_to_monitor: f_to_m,
            monitor_from_feed: m_from_f,
            monitor_to_recorder: m_to_r,
            recorder_from_monitor: r_from_m,
            monitor_to_presenter: m_to_p,
            presenter_from_monitor: p_from_m,
            simulator_to_timer: s_to_t,
            timer_from_simulator: t_from_s,
            timer_to_simulator: t_to_s,
            simulator_from_timer: s_from_t,
        }
    }
}


impl Default for Channels {
    fn default() -> Self {
        Self::new()
    }
}
