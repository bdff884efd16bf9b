//! Demo that pushes a couple of synthetic ideas through the notifier mux
//! (stdout/log only when no channels are configured).

use tradewire::{AcceptedIdea, NotifierMux, SignalClass};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).init();
    let mux = NotifierMux::from_env();

    let ideas = vec![
        AcceptedIdea {
            name: "AAPL".into(),
            asset_type: "stock".into(),
            signal: SignalClass::Buy,
            rationale: "demo rationale".into(),
            confidence: 85.0,
            affects_held_position: true,
        },
        AcceptedIdea {
            name: "Gold".into(),
            asset_type: "commodity".into(),
            signal: SignalClass::Sell,
            rationale: "demo rationale".into(),
            confidence: 72.0,
            affects_held_position: true,
        },
    ];

    if let Err(e) = mux.deliver(&ideas).await {
        eprintln!("delivery failed: {e:#}");
    }
    println!("notify-demo done");
}
