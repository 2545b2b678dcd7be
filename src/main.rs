fn main() {
    aglecare_lib::run()
}
