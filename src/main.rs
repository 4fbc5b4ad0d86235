fn main() -> anyhow::Result<()> {
    talkpoints_lib::run()
}
