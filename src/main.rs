fn main() -> anyhow::Result<()> {
    star_donuts::run()
}
