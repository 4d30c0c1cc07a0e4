use adsdash_core::storage::KeyValueStore;
use adsdash_core::ErrorHandler;

pub fn run_clear<S: KeyValueStore>(handler: &ErrorHandler<S>) {
    handler.clear();
    println!("Error log cleared.");
}
