use shadow_rs::ShadowBuilder;

fn main() {
    // Build metadata for `natsify --version`
    ShadowBuilder::builder()
        .build()
        .expect("Failed to generate build metadata");
}
