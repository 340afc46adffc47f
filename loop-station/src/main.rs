use loop_station::pod::PodClass;
use loop_station::station::LoopStation;
use tracing_subscriber::EnvFilter;

fn main() {
    // Honour RUST_LOG, e.g. RUST_LOG=loop_station=trace
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut station = LoopStation::new();

    // Create two priority pods, boarding through the returned references
    let pod = station.create_pod(2, PodClass::Priority);
    pod.board("Ada").expect("a new pod accepts boarding");
    pod.board("Bob").expect("a new pod accepts boarding");
    station
        .create_pod(4, PodClass::Priority)
        .board("Cam")
        .expect("a new pod accepts boarding");

    // Create two standard pods; the last one carries a latent fault that
    // will trip on its first self-test
    let pod = station.create_pod(4, PodClass::Standard);
    pod.board("Dee").expect("a new pod accepts boarding");
    pod.board("Eli").expect("a new pod accepts boarding");
    let doomed = station.create_pod(2, PodClass::Standard);
    doomed.board("Mal").expect("a new pod accepts boarding");
    doomed.set_fault_after(0);

    println!(
        "Waiting to launch: {} pods carrying {} passengers",
        station.waiting_count(),
        station.passenger_count()
    );
    println!("  priority track: {}", station.waiting_priority());
    println!("  standard track: {}", station.waiting_standard());

    // Drain the waiting tracks: priority pods first, oldest first within
    // each class
    let mut launches = 0;
    while station.launch_pod().is_ok() {
        launches += 1;
    }
    println!();
    println!("Launched {launches} pods onto the loop:");
    println!("  {}", station.launched());

    // Maintenance sweep: self-test every pod on the loop and drop the
    // ones that fail
    let removed = station.clear_faulty();
    println!();
    println!("Maintenance sweep removed {removed} faulty pod(s):");
    println!("  {}", station.launched());
    println!(
        "{} passengers still tracked across the station",
        station.passenger_count()
    );
}
