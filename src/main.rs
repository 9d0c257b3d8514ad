fn main() -> anyhow::Result<()> {
    capture_supervisor_lib::run()
}
