fn main() {
    kawpool::main();
}
