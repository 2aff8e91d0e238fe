//! Example: Debouncing keystrokes and throttling scroll events on a virtual clock


use metronome::tools::{DebounceOptions, ThrottleOptions};
use metronome::{EventLoop, debounce, throttle};
use std::time::Duration;

fn main() -> metronome::Result<()> {
    let lp = EventLoop::with_virtual_clock();

    let search = debounce(
        &lp,
        |query: String| println!("searching for {query:?}"),
        Duration::from_millis(150),
        DebounceOptions::default(),
    )?;

    let scroll = throttle(
        &lp,
        |offset: u32| println!("rendering at offset {offset}"),
        Duration::from_millis(100),
        ThrottleOptions::default(),
    )?;

    // A user typing "rust" with 50ms between keystrokes
    for prefix in ["r", "ru", "rus", "rust"] {
        search.invoke(prefix.to_string())?;
        lp.run_for(Duration::from_millis(50))?;
    }

    // Scroll events every 20ms
    for offset in (0..10).map(|i| i * 40) {
        scroll.invoke(offset)?;
        lp.run_for(Duration::from_millis(20))?;
    }

    lp.run();
    println!("done at {}", lp.now());

    Ok(())
}
